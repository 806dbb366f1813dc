use crate::{
    core::geo::{GeometryEnvelope, LngLat},
    MapError, Result,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A GeoJSON position; anything past longitude and latitude is ignored
pub type Position = Vec<f64>;

/// GeoJSON geometry types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point {
        coordinates: Position,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPoint {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    GeometryCollection {
        geometries: Vec<GeoJsonGeometry>,
    },
}

impl GeoJsonGeometry {
    /// Grows `envelope` over every vertex of the geometry.
    ///
    /// Polygon holes are included; multi-part geometries and collections
    /// contribute the union of their parts.
    pub fn extend_envelope(&self, envelope: &mut GeometryEnvelope) {
        match self {
            Self::Point { coordinates } => extend_positions(envelope, std::iter::once(coordinates)),
            Self::LineString { coordinates } | Self::MultiPoint { coordinates } => {
                extend_positions(envelope, coordinates)
            }
            Self::Polygon { coordinates } | Self::MultiLineString { coordinates } => {
                extend_positions(envelope, coordinates.iter().flatten())
            }
            Self::MultiPolygon { coordinates } => {
                extend_positions(envelope, coordinates.iter().flatten().flatten())
            }
            Self::GeometryCollection { geometries } => {
                for geometry in geometries {
                    geometry.extend_envelope(envelope);
                }
            }
        }
    }
}

fn extend_positions<'a>(
    envelope: &mut GeometryEnvelope,
    positions: impl IntoIterator<Item = &'a Position>,
) {
    for point in positions.into_iter().filter_map(|p| LngLat::from_position(p)) {
        envelope.extend(point);
    }
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonFeature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub geometry: Option<GeoJsonGeometry>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

/// Root GeoJSON object
#[derive(Debug, Clone, PartialEq)]
pub enum GeoJson {
    Feature(GeoJsonFeature),
    FeatureCollection(Vec<GeoJsonFeature>),
    Geometry(GeoJsonGeometry),
}

#[derive(Deserialize)]
struct FeatureCollectionBody {
    #[serde(default)]
    features: Vec<GeoJsonFeature>,
}

impl GeoJson {
    /// Dispatches on the `type` member of a decoded GeoJSON object
    pub fn from_value(value: Value) -> Result<Self> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| MapError::ParseError("GeoJSON object without a type".to_string()))?;

        match kind.as_str() {
            "FeatureCollection" => {
                let body: FeatureCollectionBody = serde_json::from_value(value)?;
                Ok(Self::FeatureCollection(body.features))
            }
            "Feature" => Ok(Self::Feature(serde_json::from_value(value)?)),
            _ => Ok(Self::Geometry(serde_json::from_value(value)?)),
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    /// Gets all features; a bare geometry has none
    pub fn features(&self) -> &[GeoJsonFeature] {
        match self {
            Self::Feature(feature) => std::slice::from_ref(feature),
            Self::FeatureCollection(features) => features,
            Self::Geometry(_) => &[],
        }
    }

    /// Bounding envelope of every coordinate in the document
    pub fn envelope(&self) -> GeometryEnvelope {
        let mut envelope = GeometryEnvelope::empty();
        match self {
            Self::Geometry(geometry) => geometry.extend_envelope(&mut envelope),
            _ => {
                for geometry in self.features().iter().filter_map(|f| f.geometry.as_ref()) {
                    geometry.extend_envelope(&mut envelope);
                }
            }
        }
        envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feature_collection_envelope() {
        let geojson = GeoJson::from_value(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}, "properties": {}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1.0, 1.0]}, "properties": {}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-1.0, 2.0]}, "properties": {}}
            ]
        }))
        .unwrap();

        assert_eq!(geojson.features().len(), 3);
        assert_eq!(
            geojson.envelope(),
            GeometryEnvelope::from_edges(-1.0, 0.0, 1.0, 2.0)
        );
    }

    #[test]
    fn test_polygon_holes_and_lines() {
        let geojson = GeoJson::from_value(json!({
            "type": "Polygon",
            "coordinates": [
                [[0, 0], [4, 0], [4, 4], [0, 4], [0, 0]],
                [[1, 1], [2, 1], [2, 2], [1, 1]]
            ]
        }))
        .unwrap();
        assert_eq!(geojson.envelope(), GeometryEnvelope::from_edges(0.0, 0.0, 4.0, 4.0));

        let line = GeoJson::from_value(json!({
            "type": "LineString",
            "coordinates": [[10.0, 45.0, 1200.0], [11.5, 46.2, 1800.0]]
        }))
        .unwrap();
        assert_eq!(line.envelope(), GeometryEnvelope::from_edges(10.0, 45.0, 11.5, 46.2));
    }

    #[test]
    fn test_multi_geometries_are_folded() {
        let geojson = GeoJson::from_value(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "MultiPoint", "coordinates": [[5, 5], [6, 7]]}},
                {"type": "Feature", "geometry": {"type": "MultiLineString", "coordinates": [[[-3, 1], [-2, 1]]]}},
                {"type": "Feature", "geometry": {"type": "MultiPolygon", "coordinates": [[[[0, -4], [1, -4], [1, -3], [0, -4]]]]}},
                {"type": "Feature", "geometry": {"type": "GeometryCollection", "geometries": [
                    {"type": "Point", "coordinates": [8, 0]}
                ]}},
                {"type": "Feature", "geometry": null}
            ]
        }))
        .unwrap();

        assert_eq!(geojson.envelope(), GeometryEnvelope::from_edges(-3.0, -4.0, 8.0, 7.0));
    }

    #[test]
    fn test_single_feature() {
        let geojson = GeoJson::from_slice(
            br#"{"type": "Feature", "geometry": {"type": "Point", "coordinates": [7, 46]}, "properties": {"title": "Hut"}}"#,
        )
        .unwrap();

        let feature = &geojson.features()[0];
        assert_eq!(feature.properties.as_ref().unwrap()["title"], "Hut");
        assert_eq!(geojson.envelope(), GeometryEnvelope::from_edges(7.0, 46.0, 7.0, 46.0));
    }

    #[test]
    fn test_untyped_object_is_rejected() {
        assert!(matches!(
            GeoJson::from_value(json!({"features": []})),
            Err(MapError::ParseError(_))
        ));
    }
}
