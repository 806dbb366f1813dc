//! Zoom limits for the active background layer
//!
//! Each background may declare its own zoom bounds (directly, through its
//! style layer, or through its source). A document-wide clamp narrows them.
//! The effective range is recomputed whenever the active background changes.

use serde::{Deserialize, Serialize};

/// Zoom bounds declared for one background layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerZoomBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Document-wide zoom bounds; they only ever narrow a layer's own range
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalZoomClamp {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl GlobalZoomClamp {
    /// Moves a value into the clamp window. The upper bound wins if the
    /// window itself is inverted.
    fn confine(&self, value: f64) -> f64 {
        let value = self.min.map_or(value, |min| value.max(min));
        self.max.map_or(value, |max| value.min(max))
    }
}

/// Resolved `[min, max]` zoom for the active background
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectiveZoomRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl EffectiveZoomRange {
    /// Snaps a camera zoom into the range
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        let zoom = self.min.map_or(zoom, |min| zoom.max(min));
        self.max.map_or(zoom, |max| zoom.min(max))
    }

    pub fn contains(&self, zoom: f64) -> bool {
        self.min.map_or(true, |min| zoom >= min) && self.max.map_or(true, |max| zoom <= max)
    }
}

pub struct ZoomConstraintResolver;

impl ZoomConstraintResolver {
    /// Combines a layer's bounds with the global clamp.
    ///
    /// Missing layer bounds fall back to the clamp; present ones are
    /// tightened by it (`max(layerMin, globalMin)`, `min(layerMax, globalMax)`).
    /// A layer range lying wholly outside the clamp collapses onto the
    /// nearest clamp edge, and an inverted result collapses onto its upper
    /// bound, so `min <= max` always holds.
    pub fn resolve(layer: &LayerZoomBounds, clamp: &GlobalZoomClamp) -> EffectiveZoomRange {
        let min = layer.min.map(|z| clamp.confine(z)).or(clamp.min);
        let max = layer.max.map(|z| clamp.confine(z)).or(clamp.max);

        match (min, max) {
            (Some(lo), Some(hi)) if lo > hi => EffectiveZoomRange {
                min: Some(hi),
                max: Some(hi),
            },
            _ => EffectiveZoomRange { min, max },
        }
    }
}
