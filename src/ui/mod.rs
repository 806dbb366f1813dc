pub mod controls;
pub mod panel;

pub use controls::{ControlSet, LayerChooser};
pub use panel::{InfoPanel, PanelStyle};

use crate::input::events::UiCommand;

/// Everything the presentation layer needs to draw the embed's chrome
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub panel: InfoPanel,
    pub layer_chooser: LayerChooser,
    pub controls: ControlSet,
    /// Pointer affordance over interactive features
    pub pointer_cursor: bool,
}

impl UiState {
    pub fn new(panel: InfoPanel, controls: ControlSet) -> Self {
        Self {
            panel,
            controls,
            ..Default::default()
        }
    }

    pub fn apply(&mut self, command: UiCommand) {
        match command {
            UiCommand::ShowPanel(record) => self.panel.show(record),
            UiCommand::HidePanel => self.panel.hide(),
            UiCommand::SetPointerCursor(on) => self.pointer_cursor = on,
            UiCommand::CloseLayerChooser => self.layer_chooser.close(),
        }
    }
}
