pub mod manager;
pub mod zoom;

// Re-export the essential types
pub use manager::{VisibilityController, VisibilityState};
pub use zoom::{EffectiveZoomRange, GlobalZoomClamp, LayerZoomBounds, ZoomConstraintResolver};
