//! Shared doubles for the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use mapframe::prelude::*;
use serde_json::{json, Value};
use std::io::Cursor;

pub const CONFIG: &str = r##"{
    "version": 8,
    "sources": {
        "streets": {"type": "raster", "tiles": ["https://tiles.example.com/streets/{z}/{x}/{y}.png"], "minzoom": 0, "maxzoom": 20},
        "satellite": {"type": "raster", "tiles": ["https://tiles.example.com/sat/{z}/{x}/{y}.jpg"], "maxzoom": 16},
        "trails": {"type": "geojson", "data": "https://data.example.com/trails.geojson"},
        "summits": {"type": "geojson", "data": "https://data.example.com/summits.geojson"}
    },
    "layers": [
        {"id": "bg1", "type": "raster", "source": "streets"},
        {"id": "bg2", "type": "raster", "source": "satellite", "layout": {"visibility": "none"}},
        {"id": "trails-line", "type": "line", "source": "trails", "layout": {"visibility": "none"}},
        {"id": "summits-symbol", "type": "symbol", "source": "summits", "layout": {"icon-image": "peak"}}
    ],
    "customUi": {
        "backgroundLayers": [
            {"id": "bg1", "name": "Streets"},
            {"id": "bg2", "name": "Satellite", "minZoom": 5}
        ],
        "dataLayers": [
            {"id": "trails", "layerIds": ["trails-line"], "name": "Trails", "visible": false},
            {"id": "summits-symbol", "name": "Summits", "interactive": true}
        ],
        "globalMaxZoom": 18
    },
    "customImageResources": [
        {"id": "peak", "url": "https://icons.example.com/peak.png"},
        {"id": "hut", "url": "https://icons.example.com/hut.png"}
    ]
}"##;

pub fn config() -> ConfigModel {
    ConfigModel::from_slice(CONFIG.as_bytes()).unwrap()
}

/// Records every command and keeps just enough state to answer queries
#[derive(Default)]
pub struct RecordingEngine {
    pub zoom: f64,
    pub viewport: (f64, f64),
    pub commands: Vec<EngineCommand>,
    pub visibility: HashMap<String, bool>,
    pub images: HashMap<String, (u32, u32)>,
    pub add_image_calls: usize,
    pub hits: Vec<RenderedFeature>,
    pub resident: HashMap<String, GeoJson>,
}

impl RecordingEngine {
    pub fn at_zoom(zoom: f64) -> Self {
        Self {
            zoom,
            viewport: (800.0, 600.0),
            ..Default::default()
        }
    }

    pub fn visibility_calls(&self) -> Vec<(String, bool)> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                EngineCommand::SetLayerVisibility { layer_id, visible } => {
                    Some((layer_id.clone(), *visible))
                }
                _ => None,
            })
            .collect()
    }

    pub fn visible_layers(&self) -> Vec<&str> {
        let mut layers: Vec<&str> = self
            .visibility
            .iter()
            .filter(|(_, visible)| **visible)
            .map(|(id, _)| id.as_str())
            .collect();
        layers.sort_unstable();
        layers
    }
}

impl IconRegistry for RecordingEngine {
    fn has_image(&self, id: &str) -> bool {
        self.images.contains_key(id)
    }

    fn add_image(&mut self, id: &str, image: &IconImage) -> Result<()> {
        self.add_image_calls += 1;
        self.images.insert(id.to_string(), (image.width, image.height));
        Ok(())
    }
}

impl RenderEngine for RecordingEngine {
    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn viewport_size(&self) -> (f64, f64) {
        self.viewport
    }

    fn query_rendered_features(&self, _point: ScreenPoint, layer_ids: &[String]) -> Vec<RenderedFeature> {
        self.hits
            .iter()
            .filter(|hit| layer_ids.contains(&hit.layer_id))
            .cloned()
            .collect()
    }

    fn source_data(&self, source_id: &str) -> Option<GeoJson> {
        self.resident.get(source_id).cloned()
    }

    fn apply(&mut self, command: &EngineCommand) -> Result<()> {
        match command {
            EngineCommand::SetLayerVisibility { layer_id, visible } => {
                self.visibility.insert(layer_id.clone(), *visible);
            }
            EngineCommand::SetZoom(zoom) => self.zoom = *zoom,
            _ => {}
        }
        self.commands.push(command.clone());
        Ok(())
    }
}

/// Serves canned bodies, counts requests and yields once per request so
/// concurrent callers really overlap
#[derive(Default)]
pub struct CountingFetcher {
    pub bodies: HashMap<String, Vec<u8>>,
    pub requests: RefCell<Vec<String>>,
}

impl CountingFetcher {
    pub fn with(mut self, url: &str, body: Vec<u8>) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    pub fn with_json(self, url: &str, body: Value) -> Self {
        self.with(url, serde_json::to_vec(&body).unwrap())
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.borrow().iter().filter(|r| *r == url).count()
    }
}

#[async_trait(?Send)]
impl Fetcher for CountingFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.borrow_mut().push(url.to_string());
        tokio::task::yield_now().await;
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| MapError::ParseError(format!("HTTP 404 for {url}")))
    }
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255])))
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .unwrap();
    bytes
}

pub fn points(coordinates: &[[f64; 2]]) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": coordinates.iter().map(|c| json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": c},
            "properties": {}
        })).collect::<Vec<_>>()
    })
}

pub fn feature(layer_id: &str, properties: Value) -> RenderedFeature {
    match properties {
        Value::Object(map) => RenderedFeature::new(layer_id, map),
        _ => RenderedFeature::new(layer_id, Default::default()),
    }
}

pub fn start(
    config: ConfigModel,
    engine: RecordingEngine,
    fetcher: CountingFetcher,
) -> (
    Rc<RefCell<RecordingEngine>>,
    Rc<CountingFetcher>,
    MapSession<RecordingEngine, CountingFetcher>,
) {
    let engine = Rc::new(RefCell::new(engine));
    let fetcher = Rc::new(fetcher);
    let session = PreparedMap::new(config)
        .attach(Rc::clone(&engine), Rc::clone(&fetcher))
        .unwrap();
    (engine, fetcher, session)
}
