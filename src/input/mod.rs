pub mod events;
pub mod picker;

// Re-export the essential types
pub use events::{EngineCommand, InputEvent, RenderedFeature, UiCommand};
pub use picker::{FeaturePicker, FeatureRecord};
