//! Auto-framing over the GeoJSON sources of a configuration

use crate::{
    constants::{DEFAULT_FIT_PADDING_PX, FIT_PADDING_FRACTION},
    core::{config::ValidatedConfig, geo::GeometryEnvelope},
    data::geojson::GeoJson,
    input::events::EngineCommand,
    traits::{Fetcher, RenderEngine},
    MapError, Result,
};
use futures::future::join_all;
use log::{debug, info, warn};
use serde_json::Value;
use std::cell::RefCell;

/// Where a source's geometry comes from when the engine holds no copy
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryData {
    Inline(GeoJson),
    Url(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeometrySource {
    pub id: String,
    pub data: GeometryData,
}

/// Computes the envelope of every vector source and the camera fit for it
pub struct BoundsFitter;

impl BoundsFitter {
    /// Snapshot of the vector sources to frame.
    ///
    /// Taken once, before any fetch is issued. Sources whose inline data
    /// cannot be parsed are logged and left out.
    pub fn plan(config: &ValidatedConfig) -> Vec<GeometrySource> {
        config
            .config()
            .sources
            .iter()
            .filter(|(_, source)| source.is_geojson())
            .filter_map(|(id, source)| {
                let data = match source.data.as_ref()? {
                    Value::String(url) => GeometryData::Url(url.clone()),
                    inline => match GeoJson::from_value(inline.clone()) {
                        Ok(geojson) => GeometryData::Inline(geojson),
                        Err(e) => {
                            warn!("inline data of source '{id}' is not GeoJSON: {e}");
                            return None;
                        }
                    },
                };
                Some(GeometrySource {
                    id: id.clone(),
                    data,
                })
            })
            .collect()
    }

    /// Union of the envelopes of all `sources`.
    ///
    /// A copy already resident in the engine wins over the declared data.
    /// Remote sources are fetched concurrently; a failed source is logged
    /// and excluded without affecting the others.
    pub async fn compute_envelope<E, F>(
        sources: &[GeometrySource],
        engine: &RefCell<E>,
        fetcher: &F,
    ) -> GeometryEnvelope
    where
        E: RenderEngine + ?Sized,
        F: Fetcher + ?Sized,
    {
        let mut envelope = GeometryEnvelope::empty();
        let mut remote = Vec::new();

        {
            let engine = engine.borrow();
            for source in sources {
                if let Some(resident) = engine.source_data(&source.id) {
                    debug!("source '{}' resident in engine", source.id);
                    envelope.union(&resident.envelope());
                    continue;
                }
                match &source.data {
                    GeometryData::Inline(geojson) => envelope.union(&geojson.envelope()),
                    GeometryData::Url(url) => remote.push((source.id.as_str(), url.as_str())),
                }
            }
        }

        let fetched = join_all(
            remote
                .into_iter()
                .map(|(id, url)| Self::fetch_geometry(fetcher, id, url)),
        )
        .await;

        for result in fetched {
            match result {
                Ok(geojson) => envelope.union(&geojson.envelope()),
                Err(e) => warn!("{e}, excluded from auto-fit"),
            }
        }

        envelope
    }

    async fn fetch_geometry<F: Fetcher + ?Sized>(
        fetcher: &F,
        source_id: &str,
        url: &str,
    ) -> Result<GeoJson> {
        let failed = |e: MapError| MapError::GeometryFetchFailed {
            source_id: source_id.to_string(),
            reason: e.to_string(),
        };
        let value = fetcher.fetch_json(url).await.map_err(failed)?;
        GeoJson::from_value(value).map_err(failed)
    }

    /// Pixel padding for a fit: a fixed override when configured, else a
    /// fraction of the viewport's shorter side. Never zero.
    pub fn padding(viewport: (f64, f64), fixed: Option<f64>) -> f64 {
        if let Some(fixed) = fixed.filter(|p| p.is_finite() && *p > 0.0) {
            return fixed;
        }
        let shorter = viewport.0.min(viewport.1);
        if shorter.is_finite() && shorter > 0.0 {
            shorter * FIT_PADDING_FRACTION
        } else {
            DEFAULT_FIT_PADDING_PX
        }
    }

    /// The camera command framing `envelope`, or `None` when there is nothing to frame
    pub fn fit(envelope: GeometryEnvelope, padding: f64) -> Option<EngineCommand> {
        if envelope.is_empty() {
            info!("no vector geometry to frame, keeping the configured view");
            return None;
        }
        info!("auto-fit to {:?} with {padding}px padding", envelope.to_array());
        Some(EngineCommand::FitBounds { envelope, padding })
    }
}
