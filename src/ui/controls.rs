use crate::core::config::ControlsConfig;
use serde::Serialize;

/// Which map controls the presentation layer should mount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSet {
    pub zoom: bool,
    pub scale: bool,
    pub layer_chooser: bool,
    pub fullscreen: bool,
    pub attribution: bool,
}

impl Default for ControlSet {
    fn default() -> Self {
        Self {
            zoom: true,
            scale: false,
            layer_chooser: true,
            fullscreen: false,
            attribution: true,
        }
    }
}

impl ControlSet {
    /// Applies the configured switches over the defaults.
    ///
    /// The layer chooser is dropped when there is nothing to choose.
    pub fn from_config(config: &ControlsConfig, backgrounds: usize, data_layers: usize) -> Self {
        let defaults = Self::default();
        let has_choice = backgrounds > 1 || data_layers > 0;
        Self {
            zoom: config.zoom.unwrap_or(defaults.zoom),
            scale: config.scale.unwrap_or(defaults.scale),
            layer_chooser: has_choice && config.layer_chooser.unwrap_or(defaults.layer_chooser),
            fullscreen: config.fullscreen.unwrap_or(defaults.fullscreen),
            attribution: config.attribution.unwrap_or(defaults.attribution),
        }
    }
}

/// Open/closed state of the layer chooser dropdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerChooser {
    open: bool,
}

impl LayerChooser {
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}
