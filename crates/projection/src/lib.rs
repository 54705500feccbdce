//! Coordinate reference system transformations.
//!
//! Implements the Transverse Mercator projection from scratch and applies it
//! to the point geometries of GeoJSON FeatureCollections.

pub mod transform;
pub mod transverse_mercator;

pub use transform::{CoordinateTransformer, ProjectionError};
pub use transverse_mercator::TransverseMercator;
