//! Feature hit-testing and detail-panel projection
//!
//! The engine performs the actual hit test; the picker decides which
//! layers are eligible, which hit wins, and what the panel shows.

use crate::{
    constants::IMAGE_SIZE_ATTRIBUTE,
    core::config::{InteractiveRule, ValidatedConfig},
    input::events::{RenderedFeature, UiCommand},
};
use serde::Serialize;

/// Panel content extracted from a clicked feature
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRecord {
    pub title: Option<String>,
    /// Raw markup, injected as-is by the presentation layer
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Width over height, from an `imageSize: "W,H"` attribute
    pub image_aspect: Option<f64>,
}

impl FeatureRecord {
    /// Projects a feature's attributes; `None` when it carries no panel content
    pub fn from_feature(feature: &RenderedFeature) -> Option<Self> {
        let record = Self {
            title: feature.attribute("title"),
            description: feature.attribute("description"),
            image_url: feature.attribute("imageUrl"),
            image_aspect: feature
                .attribute(IMAGE_SIZE_ATTRIBUTE)
                .as_deref()
                .and_then(parse_aspect),
        };
        record.has_content().then_some(record)
    }

    pub fn has_content(&self) -> bool {
        self.title.is_some() || self.description.is_some() || self.image_url.is_some()
    }
}

/// Parses `"W,H"` into `W / H`
pub fn parse_aspect(size: &str) -> Option<f64> {
    let (width, height) = size.split_once(',')?;
    let width: f64 = width.trim().parse().ok()?;
    let height: f64 = height.trim().parse().ok()?;
    let aspect = width / height;
    (aspect.is_finite() && aspect > 0.0).then_some(aspect)
}

/// Decides hover affordance and click selection for interactive layers
#[derive(Debug, Clone)]
pub struct FeaturePicker {
    interactive_layers: Vec<String>,
    rule: InteractiveRule,
}

impl FeaturePicker {
    pub fn new(config: &ValidatedConfig) -> Self {
        let rule = config.custom_ui().interactive_rule;
        let interactive_layers = config
            .data_layers()
            .iter()
            .filter(|entry| rule == InteractiveRule::Attributes || entry.interactive)
            .flat_map(|entry| entry.layer_ids.iter().cloned())
            .collect();

        Self {
            interactive_layers,
            rule,
        }
    }

    /// Layer ids the engine should hit-test against
    pub fn interactive_layers(&self) -> &[String] {
        &self.interactive_layers
    }

    pub fn has_interactive_layers(&self) -> bool {
        !self.interactive_layers.is_empty()
    }

    /// Cursor affordance: on iff some eligible feature is under the pointer
    pub fn on_pointer_move(&self, hits: &[RenderedFeature]) -> UiCommand {
        let hovering = match self.rule {
            InteractiveRule::Flag => !hits.is_empty(),
            InteractiveRule::Attributes => hits.iter().any(carries_text),
        };
        UiCommand::SetPointerCursor(hovering)
    }

    /// Selects the topmost eligible feature.
    ///
    /// A click always closes the layer chooser. With no eligible hit, or a
    /// topmost hit without panel content, the panel is dismissed.
    pub fn on_click(&self, hits: &[RenderedFeature]) -> (Option<FeatureRecord>, Vec<UiCommand>) {
        let topmost = match self.rule {
            InteractiveRule::Flag => hits.first(),
            InteractiveRule::Attributes => hits.iter().find(|hit| carries_text(hit)),
        };
        let record = topmost.and_then(FeatureRecord::from_feature);

        let panel = match &record {
            Some(record) => UiCommand::ShowPanel(record.clone()),
            None => UiCommand::HidePanel,
        };
        (record, vec![UiCommand::CloseLayerChooser, panel])
    }
}

fn carries_text(feature: &RenderedFeature) -> bool {
    feature.properties.contains_key("title") || feature.properties.contains_key("description")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::test_support::sample_config;
    use serde_json::json;

    fn feature(layer_id: &str, properties: serde_json::Value) -> RenderedFeature {
        match properties {
            serde_json::Value::Object(map) => RenderedFeature::new(layer_id, map),
            _ => RenderedFeature::new(layer_id, Default::default()),
        }
    }

    #[test]
    fn test_interactive_layers_follow_flag() {
        let picker = FeaturePicker::new(&sample_config().validate());
        assert_eq!(
            picker.interactive_layers(),
            ["trails-casing", "trails-line", "peaks-symbol"]
        );
    }

    #[test]
    fn test_attribute_rule_covers_all_data_layers() {
        let mut config = sample_config();
        config.custom_ui.data_layers[1].interactive = Some(false);
        config.custom_ui.interactive_rule = InteractiveRule::Attributes;
        let picker = FeaturePicker::new(&config.validate());

        assert_eq!(picker.interactive_layers().len(), 3);
        let plain = feature("trails-line", json!({"difficulty": "hard"}));
        assert_eq!(picker.on_pointer_move(&[plain.clone()]), UiCommand::SetPointerCursor(false));

        let titled = feature("trails-line", json!({"title": "Ridge trail"}));
        let (record, _) = picker.on_click(&[plain, titled]);
        assert_eq!(record.unwrap().title.as_deref(), Some("Ridge trail"));
    }

    #[test]
    fn test_pointer_move_reflects_hits() {
        let picker = FeaturePicker::new(&sample_config().validate());
        assert_eq!(picker.on_pointer_move(&[]), UiCommand::SetPointerCursor(false));
        assert_eq!(
            picker.on_pointer_move(&[feature("peaks-symbol", json!({}))]),
            UiCommand::SetPointerCursor(true)
        );
    }

    #[test]
    fn test_click_away_hides_panel() {
        let picker = FeaturePicker::new(&sample_config().validate());
        let (record, commands) = picker.on_click(&[]);

        assert!(record.is_none());
        assert_eq!(commands, vec![UiCommand::CloseLayerChooser, UiCommand::HidePanel]);
    }

    #[test]
    fn test_click_takes_topmost_feature() {
        let picker = FeaturePicker::new(&sample_config().validate());
        let hits = [
            feature(
                "peaks-symbol",
                json!({
                    "title": "Mont Blanc",
                    "description": "<b>4808 m</b>",
                    "imageUrl": "https://img.example.com/mb.jpg",
                    "imageSize": "1600,900"
                }),
            ),
            feature("trails-line", json!({"title": "Underneath"})),
        ];

        let (record, commands) = picker.on_click(&hits);
        let record = record.unwrap();
        assert_eq!(record.title.as_deref(), Some("Mont Blanc"));
        assert_eq!(record.description.as_deref(), Some("<b>4808 m</b>"));
        assert_eq!(record.image_url.as_deref(), Some("https://img.example.com/mb.jpg"));
        assert!((record.image_aspect.unwrap() - 16.0 / 9.0).abs() < 1e-9);
        assert_eq!(commands[1], UiCommand::ShowPanel(record));
    }

    #[test]
    fn test_feature_without_content_is_not_shown() {
        let picker = FeaturePicker::new(&sample_config().validate());
        let (record, commands) = picker.on_click(&[feature("trails-line", json!({"id": 4}))]);
        assert!(record.is_none());
        assert_eq!(commands[1], UiCommand::HidePanel);
    }

    #[test]
    fn test_parse_aspect() {
        assert_eq!(parse_aspect("400,200"), Some(2.0));
        assert_eq!(parse_aspect(" 3 , 4 "), Some(0.75));
        assert_eq!(parse_aspect("400"), None);
        assert_eq!(parse_aspect("400,0"), None);
        assert_eq!(parse_aspect("wide,tall"), None);
    }
}
