//! Typed configuration document for an embedded map
//!
//! The document is a regular map style (`sources`, `layers`, optional
//! initial view) extended with a `customUi` block and an optional
//! `customImageResources` table. It is deserialized once at the load
//! boundary and then checked by [`ConfigModel::validate`], which resolves
//! every `customUi` entry against the style and drops the ones that point
//! at layers the style does not define.

use crate::{
    constants::{HIDDEN, ICON_IMAGE_PROPERTY, VISIBILITY_PROPERTY},
    core::geo::{GeometryEnvelope, LngLat},
    images::icon::IconResource,
    layers::zoom::{GlobalZoomClamp, LayerZoomBounds},
    prelude::HashSet,
    ui::panel::PanelStyle,
    MapError, Result,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Keys that belong to the embed, not to the map style.
const EMBED_ONLY_KEYS: [&str; 3] = ["customUi", "customImageResources", "bounds"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigModel {
    #[serde(default)]
    pub sources: BTreeMap<String, SourceSpec>,
    #[serde(default)]
    pub layers: Vec<StyleLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    /// Explicit initial view as `[west, south, east, north]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[f64; 4]>,
    #[serde(default)]
    pub custom_ui: CustomUi,
    #[serde(default)]
    pub custom_image_resources: Vec<IconResourceSpec>,
    /// Remaining style fields (`version`, `glyphs`, `sprite`, ...) passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the style's `sources` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    #[serde(rename = "type")]
    pub kind: String,
    /// GeoJSON payload: a URL string or an inline object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minzoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxzoom: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SourceSpec {
    pub fn is_geojson(&self) -> bool {
        self.kind == "geojson"
    }
}

/// One entry of the style's `layers` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleLayer {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minzoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxzoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub layout: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StyleLayer {
    /// Layout visibility as encoded in the raw document; absent means visible.
    pub fn is_visible(&self) -> bool {
        self.layout.get(VISIBILITY_PROPERTY).and_then(Value::as_str) != Some(HIDDEN)
    }

    /// Icon id when the layer references a single, literal icon
    pub fn icon_image(&self) -> Option<&str> {
        self.layout.get(ICON_IMAGE_PROPERTY).and_then(Value::as_str)
    }

    pub fn set_icon_image(&mut self, icon_id: &str) {
        self.layout.insert(
            ICON_IMAGE_PROPERTY.to_string(),
            Value::String(icon_id.to_string()),
        );
    }
}

/// The embed-specific `customUi` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomUi {
    #[serde(default)]
    pub panel: PanelStyle,
    #[serde(default)]
    pub controls: ControlsConfig,
    #[serde(default)]
    pub background_layers: Vec<BackgroundLayerSpec>,
    #[serde(default)]
    pub data_layers: Vec<DataLayerSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_min_zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_max_zoom: Option<f64>,
    #[serde(default)]
    pub interactive_rule: InteractiveRule,
    #[serde(default)]
    pub icon_strategy: IconStrategy,
    /// Fixed auto-fit padding in pixels, overriding the proportional default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_padding: Option<f64>,
}

/// Which UI controls the embed shows. Unset entries fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_chooser: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullscreen: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundLayerSpec {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataLayerSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_ids: Option<Vec<String>>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactive: Option<bool>,
}

impl DataLayerSpec {
    /// The style layers this entry toggles. `layerIds` wins over `id`.
    pub fn layer_refs(&self) -> Vec<&str> {
        match &self.layer_ids {
            Some(ids) if !ids.is_empty() => ids.iter().map(String::as_str).collect(),
            _ => self.id.as_deref().into_iter().collect(),
        }
    }

    /// Identifier of the entry itself; the first layer id when `id` is absent.
    pub fn key(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or_else(|| self.layer_refs().first().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconResourceSpec {
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_ratio: Option<f32>,
}

/// How the interactive layer set is determined for a deployment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractiveRule {
    /// Data layers marked `interactive: true`
    #[default]
    Flag,
    /// Every data layer, restricted to features carrying `title` or `description`
    Attributes,
}

/// How custom icons are provisioned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconStrategy {
    /// Load on the engine's missing-image notification
    #[default]
    Lazy,
    /// Render with a transparent placeholder, swap real icons in after load
    Placeholder,
}

impl ConfigModel {
    /// Parses a configuration document from raw JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Parses a configuration document from an already decoded JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn layer(&self, layer_id: &str) -> Option<&StyleLayer> {
        self.layers.iter().find(|layer| layer.id == layer_id)
    }

    pub fn source(&self, source_id: &str) -> Option<&SourceSpec> {
        self.sources.get(source_id)
    }

    /// The plain map style handed to the rendering engine, without embed-only keys
    pub fn style_document(&self) -> Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            for key in EMBED_ONLY_KEYS {
                map.remove(key);
            }
        }
        Ok(value)
    }

    /// Resolves every `customUi` entry against the style.
    ///
    /// Entries referencing unknown layers are logged and skipped rather than
    /// failing the whole document.
    pub fn validate(self) -> ValidatedConfig {
        let mut report = ValidationReport::default();

        let mut seen = HashSet::default();
        let mut backgrounds = Vec::new();
        for spec in &self.custom_ui.background_layers {
            let Some(layer) = self.layer(&spec.id) else {
                report.reject(format!("background layer '{}'", spec.id), &spec.id);
                continue;
            };
            if !seen.insert(spec.id.clone()) {
                warn!("duplicate background layer '{}' ignored", spec.id);
                report.skipped_entries.push(spec.id.clone());
                continue;
            }
            let source = layer.source.as_deref().and_then(|id| self.source(id));
            backgrounds.push(BackgroundEntry {
                id: spec.id.clone(),
                name: display_name(&spec.name, &spec.id),
                zoom_bounds: LayerZoomBounds {
                    min: spec
                        .min_zoom
                        .or(layer.minzoom)
                        .or_else(|| source.and_then(|s| s.minzoom)),
                    max: spec
                        .max_zoom
                        .or(layer.maxzoom)
                        .or_else(|| source.and_then(|s| s.maxzoom)),
                },
                initially_visible: layer.is_visible(),
            });
        }

        let background_ids: HashSet<&str> = backgrounds.iter().map(|b| b.id.as_str()).collect();
        let mut seen = HashSet::default();
        let mut data_layers = Vec::new();
        for spec in &self.custom_ui.data_layers {
            let Some(key) = spec.key() else {
                warn!("data layer entry '{}' names no layers, skipped", spec.name);
                report.skipped_entries.push(spec.name.clone());
                continue;
            };
            let entry_label = format!("data layer '{key}'");
            let mut layer_ids = Vec::new();
            for layer_id in spec.layer_refs() {
                if background_ids.contains(layer_id) {
                    report.reject_background(entry_label.clone(), layer_id);
                } else if self.layer(layer_id).is_some() {
                    layer_ids.push(layer_id.to_string());
                } else {
                    report.reject(entry_label.clone(), layer_id);
                }
            }
            if layer_ids.is_empty() {
                report.skipped_entries.push(key.to_string());
                continue;
            }
            if !seen.insert(key.to_string()) {
                warn!("duplicate data layer '{key}' ignored");
                report.skipped_entries.push(key.to_string());
                continue;
            }
            let initially_visible = spec.visible.unwrap_or_else(|| {
                layer_ids
                    .iter()
                    .filter_map(|id| self.layer(id))
                    .any(StyleLayer::is_visible)
            });
            data_layers.push(DataLayerEntry {
                id: key.to_string(),
                name: display_name(&spec.name, key),
                layer_ids,
                initially_visible,
                interactive: spec.interactive.unwrap_or(false),
            });
        }

        let zoom_clamp = GlobalZoomClamp {
            min: self.custom_ui.global_min_zoom,
            max: self.custom_ui.global_max_zoom,
        };
        if let (Some(min), Some(max)) = (zoom_clamp.min, zoom_clamp.max) {
            if min > max {
                warn!("globalMinZoom {min} exceeds globalMaxZoom {max}");
            }
        }

        let mut seen = HashSet::default();
        let mut icons = Vec::new();
        for spec in &self.custom_image_resources {
            if spec.id.is_empty() || spec.url.is_empty() {
                warn!("icon resource with empty id or url skipped");
                continue;
            }
            if !seen.insert(spec.id.clone()) {
                warn!("duplicate icon resource '{}' ignored", spec.id);
                continue;
            }
            icons.push(IconResource::new(
                spec.id.clone(),
                spec.url.clone(),
                spec.pixel_ratio.unwrap_or(1.0),
            ));
        }

        let initial_view = self.initial_view();

        debug!(
            "validated config: {} backgrounds, {} data layers, {} icons, {} rejected references",
            backgrounds.len(),
            data_layers.len(),
            icons.len(),
            report.invalid_references.len()
        );

        ValidatedConfig {
            config: self,
            backgrounds,
            data_layers,
            zoom_clamp,
            icons,
            initial_view,
            report,
        }
    }
}

impl ConfigModel {
    /// Explicit `center`+`zoom`, else explicit `bounds`, else auto-fit.
    /// Out-of-range coordinates and inverted bounds are logged and ignored.
    fn initial_view(&self) -> InitialView {
        if let (Some([lng, lat]), Some(zoom)) = (self.center, self.zoom) {
            let center = LngLat::new(lng, lat);
            if center.is_valid() {
                return InitialView::CenterZoom { center, zoom };
            }
            warn!("center [{lng}, {lat}] is out of range, ignored");
        }

        if let Some([west, south, east, north]) = self.bounds {
            let corners = [LngLat::new(west, south), LngLat::new(east, north)];
            if west > east {
                warn!("bounds crossing the antimeridian (west {west} > east {east}) are not supported, ignored");
            } else if south > north {
                warn!("bounds with south {south} > north {north} ignored");
            } else if !corners.iter().all(LngLat::is_valid) {
                warn!("bounds {:?} are out of range, ignored", [west, south, east, north]);
            } else {
                return InitialView::Bounds(GeometryEnvelope::from_edges(west, south, east, north));
            }
        }

        InitialView::AutoFit
    }
}

fn display_name(name: &str, fallback: &str) -> String {
    if name.is_empty() {
        fallback.to_string()
    } else {
        name.to_string()
    }
}

/// A background option resolved against the style
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundEntry {
    pub id: String,
    pub name: String,
    /// Entry bounds, else the style layer's, else its source's
    pub zoom_bounds: LayerZoomBounds,
    pub initially_visible: bool,
}

/// An overlay option resolved against the style
#[derive(Debug, Clone, PartialEq)]
pub struct DataLayerEntry {
    pub id: String,
    pub name: String,
    /// Style layers toggled together; never empty
    pub layer_ids: Vec<String>,
    pub initially_visible: bool,
    pub interactive: bool,
}

/// How the camera is positioned when the map first loads
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InitialView {
    CenterZoom { center: LngLat, zoom: f64 },
    Bounds(GeometryEnvelope),
    /// Frame the geometry of all GeoJSON sources
    AutoFit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidReference {
    pub entry: String,
    pub layer_id: String,
}

/// Problems found while validating, kept for display after logging
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub invalid_references: Vec<InvalidReference>,
    pub skipped_entries: Vec<String>,
}

impl ValidationReport {
    fn reject(&mut self, entry: String, layer_id: &str) {
        let error = MapError::InvalidLayerReference {
            entry: entry.clone(),
            layer_id: layer_id.to_string(),
        };
        warn!("{error}, entry skipped");
        self.invalid_references.push(InvalidReference {
            entry,
            layer_id: layer_id.to_string(),
        });
    }

    /// Background visibility belongs to the background selector alone
    fn reject_background(&mut self, entry: String, layer_id: &str) {
        warn!("{entry} references background layer '{layer_id}', skipped");
        self.invalid_references.push(InvalidReference {
            entry,
            layer_id: layer_id.to_string(),
        });
    }

    pub fn is_clean(&self) -> bool {
        self.invalid_references.is_empty() && self.skipped_entries.is_empty()
    }
}

/// A configuration whose `customUi` entries all reference real style layers
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    config: ConfigModel,
    backgrounds: Vec<BackgroundEntry>,
    data_layers: Vec<DataLayerEntry>,
    zoom_clamp: GlobalZoomClamp,
    icons: Vec<IconResource>,
    initial_view: InitialView,
    report: ValidationReport,
}

impl ValidatedConfig {
    pub fn config(&self) -> &ConfigModel {
        &self.config
    }

    pub fn custom_ui(&self) -> &CustomUi {
        &self.config.custom_ui
    }

    pub fn backgrounds(&self) -> &[BackgroundEntry] {
        &self.backgrounds
    }

    pub fn background(&self, id: &str) -> Option<&BackgroundEntry> {
        self.backgrounds.iter().find(|entry| entry.id == id)
    }

    pub fn data_layers(&self) -> &[DataLayerEntry] {
        &self.data_layers
    }

    pub fn data_layer(&self, id: &str) -> Option<&DataLayerEntry> {
        self.data_layers.iter().find(|entry| entry.id == id)
    }

    pub fn zoom_clamp(&self) -> GlobalZoomClamp {
        self.zoom_clamp
    }

    pub fn icons(&self) -> &[IconResource] {
        &self.icons
    }

    pub fn initial_view(&self) -> InitialView {
        self.initial_view
    }

    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// Style layers, mutable only before the engine has seen the style
    pub(crate) fn layers_mut(&mut self) -> &mut [StyleLayer] {
        &mut self.config.layers
    }
}
