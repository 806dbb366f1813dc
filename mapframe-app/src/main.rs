use log::info;
use mapframe::prelude::*;
use std::{env, fs};

/// Stand-in renderer: logs every command and tracks the little state the
/// controller reads back
struct ConsoleEngine {
    zoom: f64,
    layers: HashSet<String>,
    images: HashSet<String>,
    applied: usize,
}

impl ConsoleEngine {
    fn new(zoom: f64, style: &serde_json::Value) -> Self {
        let layers = style["layers"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|layer| layer["id"].as_str().map(str::to_string))
            .collect();
        Self {
            zoom,
            layers,
            images: HashSet::default(),
            applied: 0,
        }
    }
}

impl IconRegistry for ConsoleEngine {
    fn has_image(&self, id: &str) -> bool {
        self.images.contains(id)
    }

    fn add_image(&mut self, id: &str, image: &IconImage) -> Result<()> {
        info!("addImage {id} {}x{} @{}x", image.width, image.height, image.pixel_ratio);
        self.images.insert(id.to_string());
        Ok(())
    }
}

impl RenderEngine for ConsoleEngine {
    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn viewport_size(&self) -> (f64, f64) {
        (1200.0, 800.0)
    }

    fn query_rendered_features(&self, _point: ScreenPoint, _layer_ids: &[String]) -> Vec<RenderedFeature> {
        Vec::new()
    }

    fn apply(&mut self, command: &EngineCommand) -> Result<()> {
        match command {
            EngineCommand::SetZoom(zoom) => self.zoom = *zoom,
            EngineCommand::SetLayerVisibility { layer_id, .. } | EngineCommand::SetIconImage { layer_id, .. }
                if !self.layers.contains(layer_id) =>
            {
                return Err(MapError::Engine(format!("style has no layer '{layer_id}'")));
            }
            _ => {}
        }
        self.applied += 1;
        info!("{}", serde_json::to_string(command)?);
        Ok(())
    }
}

/// Loads the configuration named on the command line: a file path, a
/// document URL, or an embed page URL carrying `?config=`
async fn read_config(arg: &str, fetcher: &HttpFetcher) -> Result<ConfigModel> {
    if !arg.starts_with("http://") && !arg.starts_with("https://") {
        let bytes = fs::read(arg).map_err(|e| MapError::ConfigurationFetchFailed(format!("{arg}: {e}")))?;
        return ConfigModel::from_slice(&bytes);
    }
    let reference = if arg.contains("config=") {
        ConfigReference::from_page_url(arg)?
    } else {
        ConfigReference::from_url(arg)?
    };
    load_config(fetcher, &reference).await
}

/// Headless map session runner
#[tokio::main(flavor = "current_thread")]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let arg = env::args()
        .nth(1)
        .ok_or("usage: mapframe-app <config.json | config URL | embed page URL>")?;

    println!("🗺️ Mapframe Headless Session");
    println!("============================");

    let fetcher = Rc::new(HttpFetcher::new());
    let config = read_config(&arg, &fetcher).await?;
    let start_zoom = config.zoom.unwrap_or(2.0);

    let prepared = PreparedMap::new(config);
    let report = prepared.config().report().clone();
    if !report.is_clean() {
        println!("⚠️ {} invalid layer references:", report.invalid_references.len());
        for invalid in &report.invalid_references {
            println!("   {} -> '{}'", invalid.entry, invalid.layer_id);
        }
    }

    let style = prepared.style()?;
    let engine = Rc::new(RefCell::new(ConsoleEngine::new(start_zoom, &style)));
    let mut session = prepared.attach(Rc::clone(&engine), fetcher)?;
    session.on_style_loaded().await?;
    println!("✅ Style loaded, camera at zoom {}", engine.borrow().zoom);

    let backgrounds: Vec<String> = session
        .config()
        .backgrounds()
        .iter()
        .map(|entry| entry.id.clone())
        .collect();
    println!("\n🎯 Cycling {} backgrounds:", backgrounds.len());
    for id in &backgrounds {
        session.set_active_background(id)?;
        let range = session.zoom_range();
        println!("   {id}: zoom {:?}..{:?}", range.min, range.max);
    }

    let data_layers: Vec<(String, bool)> = session
        .config()
        .data_layers()
        .iter()
        .map(|entry| (entry.id.clone(), session.visibility_state().is_data_layer_visible(&entry.id)))
        .collect();
    println!("\n🚀 Toggling {} data layers:", data_layers.len());
    for (id, visible) in &data_layers {
        session.set_data_layer_visible(id, !visible)?;
        session.set_data_layer_visible(id, *visible)?;
        println!("   {id}: {}", if *visible { "visible" } else { "hidden" });
    }

    for icon in session.config().icons() {
        if let Err(e) = session.on_image_missing(&icon.id).await {
            println!("   ❌ {e}");
        }
    }

    let controls = serde_json::to_string(&session.ui_state().controls)?;
    println!("\n📊 Summary");
    println!("   Commands applied: {}", engine.borrow().applied);
    println!("   Icons registered: {}", engine.borrow().images.len());
    println!("   Controls: {controls}");

    Ok(())
}
