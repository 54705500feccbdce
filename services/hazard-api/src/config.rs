//! Output reprojection settings.

use std::collections::HashMap;

use hazard_common::{CrsCode, HazardError, HazardResult};
use projection::CoordinateTransformer;

/// How ranking results are reprojected before they are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformConfig {
    /// Reproject stored geometries before responding
    pub enabled: bool,
    /// EPSG code of the stored geometries
    pub source_epsg: u32,
    /// EPSG code clients receive
    pub target_epsg: u32,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source_epsg: CrsCode::UTM_15N.epsg(),
            target_epsg: CrsCode::Wgs84.epsg(),
        }
    }
}

impl TransformConfig {
    /// Load from process environment variables.
    pub fn from_env() -> HazardResult<Self> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Load from a variable map.
    ///
    /// `HAZARD_TRANSFORM_OUTPUT` (default `true`), `HAZARD_SOURCE_EPSG`
    /// (default 32615), `HAZARD_TARGET_EPSG` (default 4326). Unsupported
    /// CRS codes are rejected here.
    pub fn from_vars(vars: &HashMap<String, String>) -> HazardResult<Self> {
        let defaults = Self::default();
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let enabled = match get("HAZARD_TRANSFORM_OUTPUT") {
            None => defaults.enabled,
            Some(raw) => parse_flag(raw).ok_or_else(|| {
                HazardError::Config(format!("HAZARD_TRANSFORM_OUTPUT has an invalid value: {}", raw))
            })?,
        };

        // Accepts "32615" as well as "EPSG:32615"
        let epsg = |key: &str, default: u32| -> HazardResult<u32> {
            match get(key) {
                None => Ok(default),
                Some(raw) => CrsCode::from_string(raw)
                    .map(|crs| crs.epsg())
                    .map_err(|e| HazardError::Config(format!("{}: {}", key, e))),
            }
        };

        Ok(Self {
            enabled,
            source_epsg: epsg("HAZARD_SOURCE_EPSG", defaults.source_epsg)?,
            target_epsg: epsg("HAZARD_TARGET_EPSG", defaults.target_epsg)?,
        })
    }

    /// The transformer to apply to every response, or `None` when disabled.
    pub fn build_transformer(&self) -> HazardResult<Option<CoordinateTransformer>> {
        if !self.enabled {
            return Ok(None);
        }
        CoordinateTransformer::from_epsg(self.source_epsg, self.target_epsg).map(Some)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
