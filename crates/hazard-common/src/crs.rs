//! Coordinate Reference System codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// CRS codes understood by the coordinate transformer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic (lon/lat in degrees), EPSG:4326
    Wgs84,
    /// WGS84 / UTM zone (meters), EPSG:326zz (north) or EPSG:327zz (south)
    Utm { zone: u8, north: bool },
}

impl CrsCode {
    /// UTM Zone 15N, the CRS the simulation results are stored in.
    pub const UTM_15N: CrsCode = CrsCode::Utm {
        zone: 15,
        north: true,
    };

    /// Resolve a numeric EPSG code.
    pub fn from_epsg(code: u32) -> Result<Self, CrsParseError> {
        match code {
            4326 => Ok(CrsCode::Wgs84),
            32601..=32660 => Ok(CrsCode::Utm {
                zone: (code - 32600) as u8,
                north: true,
            }),
            32701..=32760 => Ok(CrsCode::Utm {
                zone: (code - 32700) as u8,
                north: false,
            }),
            _ => Err(CrsParseError::UnsupportedCrs(code.to_string())),
        }
    }

    /// Parse a CRS string.
    ///
    /// Accepts formats like:
    /// - "EPSG:32615"
    /// - "epsg:4326"
    /// - "CRS:84" (EPSG:4326 with lon/lat axis order)
    /// - "32615"
    pub fn from_string(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.trim().to_uppercase();
        if normalized == "CRS:84" {
            return Ok(CrsCode::Wgs84);
        }

        let digits = normalized.strip_prefix("EPSG:").unwrap_or(&normalized);
        let code: u32 = digits
            .parse()
            .map_err(|_| CrsParseError::UnsupportedCrs(s.to_string()))?;
        Self::from_epsg(code)
    }

    pub fn epsg(&self) -> u32 {
        match self {
            CrsCode::Wgs84 => 4326,
            CrsCode::Utm { zone, north: true } => 32600 + u32::from(*zone),
            CrsCode::Utm { zone, north: false } => 32700 + u32::from(*zone),
        }
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crs() {
        assert_eq!(CrsCode::from_string("EPSG:4326").unwrap(), CrsCode::Wgs84);
        assert_eq!(CrsCode::from_string("CRS:84").unwrap(), CrsCode::Wgs84);
        assert_eq!(CrsCode::from_string("epsg:32615").unwrap(), CrsCode::UTM_15N);
        assert_eq!(
            CrsCode::from_string("32733").unwrap(),
            CrsCode::Utm {
                zone: 33,
                north: false
            }
        );
        assert!(CrsCode::from_string("EPSG:3857").is_err());
        assert!(CrsCode::from_string("EPSG:32661").is_err());
        assert!(CrsCode::from_string("utm").is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for code in [4326, 32601, 32615, 32660, 32701, 32760] {
            let crs = CrsCode::from_epsg(code).unwrap();
            assert_eq!(crs.epsg(), code);
            assert_eq!(CrsCode::from_string(&crs.to_string()).unwrap(), crs);
        }
    }
}
