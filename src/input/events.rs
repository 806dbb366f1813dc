use crate::{
    core::geo::{GeometryEnvelope, ScreenPoint},
    input::picker::FeatureRecord,
    layers::zoom::EffectiveZoomRange,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Pointer input forwarded from the map surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Single click/tap
    Click { position: ScreenPoint },
    /// Double click/tap
    DoubleClick { position: ScreenPoint },
    /// Mouse/finger move
    MouseMove { position: ScreenPoint },
    /// Start of a pan
    DragStart { position: ScreenPoint },
}

/// A side effect the controller wants the rendering engine to perform
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", content = "args", rename_all = "camelCase")]
pub enum EngineCommand {
    /// Set a style layer's layout visibility
    #[serde(rename_all = "camelCase")]
    SetLayerVisibility { layer_id: String, visible: bool },
    /// Replace the camera's min/max zoom; `None` clears a limit
    SetZoomRange(EffectiveZoomRange),
    /// Jump the camera to a zoom level without animating
    SetZoom(f64),
    /// Frame the camera on an envelope with pixel padding
    FitBounds {
        envelope: GeometryEnvelope,
        padding: f64,
    },
    /// Point a symbol layer's `icon-image` at another icon id
    #[serde(rename_all = "camelCase")]
    SetIconImage { layer_id: String, icon_id: String },
}

/// A side effect on the embed's own UI chrome
#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    ShowPanel(FeatureRecord),
    HidePanel,
    /// Pointer affordance over interactive features
    SetPointerCursor(bool),
    CloseLayerChooser,
}

/// A feature returned by the engine's hit test, topmost first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedFeature {
    pub layer_id: String,
    pub properties: Map<String, Value>,
}

impl RenderedFeature {
    pub fn new(layer_id: impl Into<String>, properties: Map<String, Value>) -> Self {
        Self {
            layer_id: layer_id.into(),
            properties,
        }
    }

    /// String attribute; numbers and booleans are rendered as text
    pub fn attribute(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }
}
