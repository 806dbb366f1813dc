//! # Mapframe
//!
//! A configuration-driven controller for embedded interactive maps.
//!
//! A single configuration document (a map style plus a `customUi` block)
//! describes the base maps, overlays, zoom limits and icons of an embed.
//! This crate interprets that document into live UI state and keeps it
//! consistent while the user interacts with the map. Rendering itself is
//! delegated to an external engine reached through [`traits::RenderEngine`].

pub mod core;
pub mod data;
pub mod fetch;
pub mod images;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod traits;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::{ConfigModel, ValidatedConfig},
    geo::{GeometryEnvelope, LngLat, ScreenPoint},
    session::{MapSession, PreparedMap},
};

pub use layers::{
    manager::{VisibilityController, VisibilityState},
    zoom::{EffectiveZoomRange, GlobalZoomClamp, ZoomConstraintResolver},
};

pub use data::{bounds::BoundsFitter, geojson::GeoJson};

pub use input::{
    events::{EngineCommand, InputEvent, RenderedFeature, UiCommand},
    picker::{FeaturePicker, FeatureRecord},
};

pub use images::{icon::IconImage, provisioner::ImageProvisioner};

pub use fetch::{load_config, ConfigReference, HttpFetcher};

pub use traits::{Fetcher, IconRegistry, RenderEngine};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("no configuration reference was supplied")]
    ConfigurationMissing,

    #[error("failed to load configuration: {0}")]
    ConfigurationFetchFailed(String),

    #[error("{entry} references unknown layer '{layer_id}'")]
    InvalidLayerReference { entry: String, layer_id: String },

    #[error("unknown background layer '{0}'")]
    UnknownBackground(String),

    #[error("unknown data layer '{0}'")]
    UnknownDataLayer(String),

    #[error("unknown icon resource '{0}'")]
    UnknownIcon(String),

    #[error("icon '{id}' failed to load: {reason}")]
    IconLoadFailed { id: String, reason: String },

    #[error("geometry for source '{source_id}' failed to load: {reason}")]
    GeometryFetchFailed { source_id: String, reason: String },

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl MapError {
    /// Whether this error ends the embed session.
    ///
    /// Only the two configuration failures are fatal; everything else is
    /// isolated to the resource or entry it concerns.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationMissing | Self::ConfigurationFetchFailed(_)
        )
    }
}

/// Error type alias for convenience
pub type Error = MapError;
