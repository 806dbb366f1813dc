use crate::{
    core::config::{BackgroundEntry, DataLayerEntry, ValidatedConfig},
    input::events::EngineCommand,
    layers::zoom::{EffectiveZoomRange, GlobalZoomClamp, ZoomConstraintResolver},
    prelude::HashSet,
    MapError, Result,
};
use log::debug;

/// Current layer visibility as the UI should show it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibilityState {
    /// `None` only before the controller is initialized
    pub active_background_id: Option<String>,
    pub visible_data_layer_ids: HashSet<String>,
}

impl VisibilityState {
    pub fn is_background_active(&self, id: &str) -> bool {
        self.active_background_id.as_deref() == Some(id)
    }

    pub fn is_data_layer_visible(&self, id: &str) -> bool {
        self.visible_data_layer_ids.contains(id)
    }
}

/// Owns background/data layer visibility and the zoom limits tied to it.
///
/// All visibility and zoom-limit writes to the engine originate here. Each
/// entry point returns the full list of engine commands for one transition;
/// the caller applies them back to back so no frame observes a partial
/// change.
#[derive(Debug, Clone)]
pub struct VisibilityController {
    backgrounds: Vec<BackgroundEntry>,
    data_layers: Vec<DataLayerEntry>,
    clamp: GlobalZoomClamp,
    state: VisibilityState,
    zoom_range: EffectiveZoomRange,
}

impl VisibilityController {
    pub fn new(config: &ValidatedConfig) -> Self {
        Self {
            backgrounds: config.backgrounds().to_vec(),
            data_layers: config.data_layers().to_vec(),
            clamp: config.zoom_clamp(),
            state: VisibilityState::default(),
            zoom_range: EffectiveZoomRange::default(),
        }
    }

    /// Establishes the startup state and returns the commands that sync the
    /// engine to it.
    ///
    /// The first background already visible in the raw style becomes active
    /// (the first declared one if none is), every other background is
    /// hidden. Data layers keep the visibility the validated config resolved.
    pub fn initialize(&mut self, current_zoom: f64) -> Vec<EngineCommand> {
        let initial = self
            .backgrounds
            .iter()
            .find(|entry| entry.initially_visible)
            .or_else(|| self.backgrounds.first())
            .map(|entry| entry.id.clone());

        let mut commands = match initial {
            Some(id) => self.activate(&id, current_zoom),
            None => Vec::new(),
        };

        self.state.visible_data_layer_ids.clear();
        for entry in &self.data_layers {
            if entry.initially_visible {
                self.state.visible_data_layer_ids.insert(entry.id.clone());
            }
            commands.extend(layer_commands(entry, entry.initially_visible));
        }

        commands
    }

    /// Makes `id` the only visible background and re-derives the zoom limits
    pub fn set_active_background(
        &mut self,
        id: &str,
        current_zoom: f64,
    ) -> Result<Vec<EngineCommand>> {
        if !self.backgrounds.iter().any(|entry| entry.id == id) {
            return Err(MapError::UnknownBackground(id.to_string()));
        }
        Ok(self.activate(id, current_zoom))
    }

    /// Shows or hides every style layer behind one data layer entry
    pub fn set_data_layer_visible(&mut self, id: &str, visible: bool) -> Result<Vec<EngineCommand>> {
        let entry = self
            .data_layers
            .iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| MapError::UnknownDataLayer(id.to_string()))?;

        if visible {
            self.state.visible_data_layer_ids.insert(entry.id.clone());
        } else {
            self.state.visible_data_layer_ids.remove(&entry.id);
        }
        debug!("data layer '{id}' -> {}", if visible { "visible" } else { "hidden" });

        Ok(layer_commands(entry, visible))
    }

    /// Commands that bring the engine back in line with the current state
    pub fn sync_commands(&self) -> Vec<EngineCommand> {
        let mut commands: Vec<EngineCommand> = self
            .backgrounds
            .iter()
            .map(|entry| EngineCommand::SetLayerVisibility {
                layer_id: entry.id.clone(),
                visible: self.state.is_background_active(&entry.id),
            })
            .collect();
        if self.state.active_background_id.is_some() {
            commands.push(EngineCommand::SetZoomRange(self.zoom_range));
        }
        for entry in &self.data_layers {
            commands.extend(layer_commands(entry, self.state.is_data_layer_visible(&entry.id)));
        }
        commands
    }

    pub fn state(&self) -> &VisibilityState {
        &self.state
    }

    pub fn zoom_range(&self) -> EffectiveZoomRange {
        self.zoom_range
    }

    pub fn backgrounds(&self) -> &[BackgroundEntry] {
        &self.backgrounds
    }

    pub fn data_layers(&self) -> &[DataLayerEntry] {
        &self.data_layers
    }

    fn activate(&mut self, id: &str, current_zoom: f64) -> Vec<EngineCommand> {
        let mut commands: Vec<EngineCommand> = self
            .backgrounds
            .iter()
            .map(|entry| EngineCommand::SetLayerVisibility {
                layer_id: entry.id.clone(),
                visible: entry.id == id,
            })
            .collect();

        // Resolved fresh every time; backgrounds may carry different bounds
        let bounds = self
            .backgrounds
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.zoom_bounds)
            .unwrap_or_default();
        self.zoom_range = ZoomConstraintResolver::resolve(&bounds, &self.clamp);
        commands.push(EngineCommand::SetZoomRange(self.zoom_range));

        if !self.zoom_range.contains(current_zoom) {
            commands.push(EngineCommand::SetZoom(self.zoom_range.clamp_zoom(current_zoom)));
        }

        debug!(
            "background '{id}' active, zoom range {:?}..{:?}",
            self.zoom_range.min, self.zoom_range.max
        );
        self.state.active_background_id = Some(id.to_string());
        commands
    }
}

fn layer_commands(entry: &DataLayerEntry, visible: bool) -> Vec<EngineCommand> {
    entry
        .layer_ids
        .iter()
        .map(|layer_id| EngineCommand::SetLayerVisibility {
            layer_id: layer_id.clone(),
            visible,
        })
        .collect()
}
