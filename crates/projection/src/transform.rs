//! Reprojection of coordinates and GeoJSON documents between CRSs.

use hazard_common::{CrsCode, HazardError};
use serde_json::Value;
use thiserror::Error;

use crate::transverse_mercator::TransverseMercator;

/// Errors raised while reprojecting coordinates.
#[derive(Debug, Error, PartialEq)]
pub enum ProjectionError {
    #[error("Unsupported CRS pair: {source_crs} -> {target_crs}")]
    UnsupportedPair {
        source_crs: CrsCode,
        target_crs: CrsCode,
    },

    #[error("Non-finite coordinate ({0}, {1})")]
    NonFinite(f64, f64),

    #[error("Coordinate ({0}, {1}) is outside the geographic domain")]
    OutOfDomain(f64, f64),

    #[error("Malformed feature {index}: {reason}")]
    Malformed { index: usize, reason: String },

    #[error("Malformed document: {0}")]
    MalformedDocument(String),
}

impl From<ProjectionError> for HazardError {
    fn from(err: ProjectionError) -> Self {
        HazardError::Transform(err.to_string())
    }
}

/// One side of a transformation.
#[derive(Debug, Clone)]
enum Side {
    Geographic,
    Projected(TransverseMercator),
}

impl Side {
    fn for_crs(crs: CrsCode) -> Self {
        match crs {
            CrsCode::Wgs84 => Side::Geographic,
            CrsCode::Utm { zone, north } => Side::Projected(TransverseMercator::utm(zone, north)),
        }
    }
}

/// Reprojects (x, y) pairs from a source CRS to a target CRS.
///
/// Axis order is always (x, y): easting/northing for projected CRSs and
/// longitude/latitude for geographic ones. Construction is independent of
/// any query, so one transformer is shared by every endpoint.
#[derive(Debug, Clone)]
pub struct CoordinateTransformer {
    source_crs: CrsCode,
    target_crs: CrsCode,
    source: Side,
    target: Side,
}

impl CoordinateTransformer {
    pub fn new(source_crs: CrsCode, target_crs: CrsCode) -> Result<Self, ProjectionError> {
        let valid_zone = |crs: CrsCode| match crs {
            CrsCode::Utm { zone, .. } => (1..=60).contains(&zone),
            CrsCode::Wgs84 => true,
        };
        if !valid_zone(source_crs) || !valid_zone(target_crs) {
            return Err(ProjectionError::UnsupportedPair {
                source_crs,
                target_crs,
            });
        }

        Ok(Self {
            source_crs,
            target_crs,
            source: Side::for_crs(source_crs),
            target: Side::for_crs(target_crs),
        })
    }

    /// Construct from numeric EPSG codes.
    pub fn from_epsg(source: u32, target: u32) -> Result<Self, HazardError> {
        let source = CrsCode::from_epsg(source).map_err(|e| HazardError::Config(e.to_string()))?;
        let target = CrsCode::from_epsg(target).map_err(|e| HazardError::Config(e.to_string()))?;
        Ok(Self::new(source, target)?)
    }

    pub fn source_crs(&self) -> CrsCode {
        self.source_crs
    }

    pub fn target_crs(&self) -> CrsCode {
        self.target_crs
    }

    /// Transformer for the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            source_crs: self.target_crs,
            target_crs: self.source_crs,
            source: self.target.clone(),
            target: self.source.clone(),
        }
    }

    /// Reproject a single (x, y) pair.
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::NonFinite(x, y));
        }
        if self.source_crs == self.target_crs {
            return Ok((x, y));
        }

        let (lon, lat) = match &self.source {
            Side::Geographic => {
                if !(-180.0..=180.0).contains(&x) || !(-90.0..=90.0).contains(&y) {
                    return Err(ProjectionError::OutOfDomain(x, y));
                }
                (x, y)
            }
            Side::Projected(tm) => tm.inverse(x, y),
        };

        let out = match &self.target {
            Side::Geographic => (lon, lat),
            Side::Projected(tm) => tm.forward(lon, lat),
        };

        if !out.0.is_finite() || !out.1.is_finite() {
            return Err(ProjectionError::NonFinite(x, y));
        }
        Ok(out)
    }

    /// Reproject every feature's point geometry in a FeatureCollection.
    ///
    /// Feature count, order and properties are left untouched. The document
    /// is only modified when every feature transforms successfully. Features
    /// with a `null` geometry are skipped.
    pub fn transform_collection(&self, document: &mut Value) -> Result<(), ProjectionError> {
        let features = document
            .get_mut("features")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| {
                ProjectionError::MalformedDocument("missing 'features' array".to_string())
            })?;

        let mut transformed = Vec::with_capacity(features.len());
        for (index, feature) in features.iter().enumerate() {
            transformed.push(self.transform_feature(index, feature)?);
        }

        for (feature, coords) in features.iter_mut().zip(transformed) {
            if let Some((x, y)) = coords {
                feature["geometry"]["coordinates"] = Value::from(vec![x, y]);
            }
        }
        Ok(())
    }

    fn transform_feature(
        &self,
        index: usize,
        feature: &Value,
    ) -> Result<Option<(f64, f64)>, ProjectionError> {
        let malformed = |reason: &str| ProjectionError::Malformed {
            index,
            reason: reason.to_string(),
        };

        let feature = feature
            .as_object()
            .ok_or_else(|| malformed("feature is not an object"))?;

        let geometry = match feature.get("geometry") {
            Some(Value::Null) => return Ok(None),
            Some(geometry) => geometry,
            None => return Err(malformed("missing geometry")),
        };

        let coords = geometry
            .get("coordinates")
            .and_then(Value::as_array)
            .ok_or_else(|| malformed("geometry has no coordinate array"))?;

        match coords.as_slice() {
            [x, y] => {
                let x = x.as_f64().ok_or_else(|| malformed("x is not a number"))?;
                let y = y.as_f64().ok_or_else(|| malformed("y is not a number"))?;
                self.transform_point(x, y).map(Some)
            }
            _ => Err(malformed("expected an [x, y] coordinate pair")),
        }
    }
}

impl Default for CoordinateTransformer {
    /// UTM Zone 15N (EPSG:32615) to WGS84 (EPSG:4326).
    fn default() -> Self {
        Self {
            source_crs: CrsCode::UTM_15N,
            target_crs: CrsCode::Wgs84,
            source: Side::for_crs(CrsCode::UTM_15N),
            target: Side::Geographic,
        }
    }
}
