pub mod bounds;
pub mod geojson;

// Re-export the essential types
pub use bounds::{BoundsFitter, GeometryData, GeometrySource};
pub use geojson::{GeoJson, GeoJsonFeature, GeoJsonGeometry};
