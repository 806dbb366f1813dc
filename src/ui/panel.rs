use crate::input::picker::FeatureRecord;
use serde::{Deserialize, Serialize};

/// Side panel appearance from `customUi.panel`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelStyle {
    #[serde(default = "default_background_color")]
    pub background_color: String,
    #[serde(default = "default_width")]
    pub width: String,
}

fn default_background_color() -> String {
    "#ffffff".to_string()
}

fn default_width() -> String {
    "300px".to_string()
}

impl Default for PanelStyle {
    fn default() -> Self {
        Self {
            background_color: default_background_color(),
            width: default_width(),
        }
    }
}

/// Detail panel showing the last clicked feature
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoPanel {
    pub style: PanelStyle,
    content: Option<FeatureRecord>,
}

impl InfoPanel {
    pub fn new(style: PanelStyle) -> Self {
        Self {
            style,
            content: None,
        }
    }

    pub fn show(&mut self, record: FeatureRecord) {
        self.content = Some(record);
    }

    pub fn hide(&mut self) {
        self.content = None;
    }

    pub fn is_visible(&self) -> bool {
        self.content.is_some()
    }

    pub fn content(&self) -> Option<&FeatureRecord> {
        self.content.as_ref()
    }
}
