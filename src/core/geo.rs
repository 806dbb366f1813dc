use geo_types::{coord, Rect};
use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate in GeoJSON axis order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    /// Creates a new LngLat coordinate
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Reads a GeoJSON position, ignoring any altitude component
    pub fn from_position(position: &[f64]) -> Option<Self> {
        match position {
            [lng, lat, ..] if lng.is_finite() && lat.is_finite() => Some(Self::new(*lng, *lat)),
            _ => None,
        }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }
}

impl Default for LngLat {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a point in screen (CSS pixel) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for ScreenPoint {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Axis-aligned geographic bounding rectangle accumulated for auto-framing.
///
/// Starts empty and only ever grows. An empty envelope means there is
/// nothing to frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeometryEnvelope {
    rect: Option<Rect<f64>>,
}

impl GeometryEnvelope {
    /// Creates an empty envelope
    pub fn empty() -> Self {
        Self { rect: None }
    }

    /// Creates an envelope from its edges
    pub fn from_edges(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            rect: Some(Rect::new(
                coord! { x: west, y: south },
                coord! { x: east, y: north },
            )),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rect.is_none()
    }

    /// Extends the envelope to include a point
    pub fn extend(&mut self, point: LngLat) {
        self.rect = Some(match self.rect {
            None => Rect::new(
                coord! { x: point.lng, y: point.lat },
                coord! { x: point.lng, y: point.lat },
            ),
            Some(rect) => Rect::new(
                coord! { x: rect.min().x.min(point.lng), y: rect.min().y.min(point.lat) },
                coord! { x: rect.max().x.max(point.lng), y: rect.max().y.max(point.lat) },
            ),
        });
    }

    /// Extends the envelope to include another envelope
    pub fn union(&mut self, other: &GeometryEnvelope) {
        if let Some(rect) = other.rect {
            self.extend(LngLat::new(rect.min().x, rect.min().y));
            self.extend(LngLat::new(rect.max().x, rect.max().y));
        }
    }

    /// Returns `[west, south, east, north]`, the order map engines take bounds in
    pub fn to_array(&self) -> Option<[f64; 4]> {
        self.rect
            .map(|r| [r.min().x, r.min().y, r.max().x, r.max().y])
    }

    /// Checks if the envelope contains a point
    pub fn contains(&self, point: LngLat) -> bool {
        self.rect.is_some_and(|r| {
            point.lng >= r.min().x
                && point.lng <= r.max().x
                && point.lat >= r.min().y
                && point.lat <= r.max().y
        })
    }
}

impl Serialize for GeometryEnvelope {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}
