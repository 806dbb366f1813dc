//! Seams between the controller and its external collaborators
//!
//! The rendering engine and the network are owned elsewhere. The
//! controller only ever talks to them through these traits, which keeps
//! all decision logic testable with in-memory doubles.

use crate::{
    core::geo::ScreenPoint,
    data::geojson::GeoJson,
    images::icon::IconImage,
    input::events::{EngineCommand, RenderedFeature},
    Result,
};
use async_trait::async_trait;

/// Icon registry of one map instance
pub trait IconRegistry {
    fn has_image(&self, id: &str) -> bool;

    /// Registers a bitmap under `id`
    fn add_image(&mut self, id: &str, image: &IconImage) -> Result<()>;
}

/// The declarative map renderer the controller drives
pub trait RenderEngine: IconRegistry {
    /// Current camera zoom
    fn zoom(&self) -> f64;

    /// Viewport size in CSS pixels
    fn viewport_size(&self) -> (f64, f64);

    /// Features rendered at `point` on any of `layer_ids`, topmost first
    fn query_rendered_features(&self, point: ScreenPoint, layer_ids: &[String])
        -> Vec<RenderedFeature>;

    /// Parsed GeoJSON the engine already holds for a source, if any
    fn source_data(&self, _source_id: &str) -> Option<GeoJson> {
        None
    }

    /// Performs one side effect
    fn apply(&mut self, command: &EngineCommand) -> Result<()>;
}

/// Plain retrieval of remote resources
#[async_trait(?Send)]
pub trait Fetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;

    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value> {
        let bytes = self.fetch_bytes(url).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
