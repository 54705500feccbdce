//! Common test fixtures for hazard ranking tests.

use serde_json::{json, Value};

/// Reference coordinates in UTM Zone 15N with their WGS84 equivalents.
///
/// Geographic values were computed independently of the crate's series
/// (numerical meridian-arc integration on the central meridian, USGS
/// Professional Paper 1395 formulas elsewhere) and agree to ~1e-9 degrees.
pub mod reference {
    /// (easting, northing, longitude, latitude)
    pub type ReferencePoint = (f64, f64, f64, f64);

    /// On the zone 15 central meridian.
    pub const CENTRAL_MERIDIAN: ReferencePoint = (500_000.0, 5_000_000.0, -93.0, 45.153_477_183_356);

    /// West of the central meridian, southern Minnesota.
    pub const SOUTH_WEST: ReferencePoint =
        (420_000.0, 4_980_000.0, -94.014_483_199_703, 44.968_934_640_167);

    /// East of the central meridian, northern Minnesota.
    pub const NORTH_EAST: ReferencePoint =
        (610_000.5, 5_300_000.25, -91.529_786_612_016, 47.843_929_818_438);

    /// West-central Minnesota.
    pub const WEST_CENTRAL: ReferencePoint =
        (350_000.0, 5_100_000.0, -94.938_485_747_936, 46.037_132_755_712);

    pub const ALL: [ReferencePoint; 4] = [CENTRAL_MERIDIAN, SOUTH_WEST, NORTH_EAST, WEST_CENTRAL];
}

/// One municipality row of a simulation results table.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRow {
    pub name: &'static str,
    pub easting: f64,
    pub northing: f64,
    pub incoming: f64,
    pub outgoing: f64,
    pub risk: f64,
}

impl SimulationRow {
    pub const fn new(
        name: &'static str,
        easting: f64,
        northing: f64,
        incoming: f64,
        outgoing: f64,
        risk: f64,
    ) -> Self {
        Self {
            name,
            easting,
            northing,
            incoming,
            outgoing,
            risk,
        }
    }

    /// Render as a GeoJSON Feature carrying the given rank, shaped like the
    /// output of PostGIS `ST_AsGeoJSON(record)`.
    pub fn to_feature(&self, rank: u64) -> Value {
        json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [self.easting, self.northing]
            },
            "properties": {
                "name": self.name,
                "incoming": self.incoming,
                "outgoing": self.outgoing,
                "risk": self.risk,
                "rank": rank
            }
        })
    }
}

/// Sample municipalities in UTM Zone 15N.
///
/// Ties are deliberate: Duluth and Rochester share `incoming`, St. Cloud and
/// Mankato share `risk`.
pub fn sample_rows() -> Vec<SimulationRow> {
    vec![
        SimulationRow::new("Minneapolis", 478_500.0, 4_980_700.0, 950.0, 410.0, 0.91),
        SimulationRow::new("Saint Paul", 489_300.0, 4_976_300.0, 720.0, 530.0, 0.84),
        SimulationRow::new("Duluth", 568_700.0, 5_183_800.0, 510.0, 120.0, 0.22),
        SimulationRow::new("Rochester", 541_000.0, 4_875_800.0, 510.0, 260.0, 0.47),
        SimulationRow::new("Saint Cloud", 403_600.0, 5_047_800.0, 300.0, 330.0, 0.35),
        SimulationRow::new("Mankato", 419_300.0, 4_893_500.0, 180.0, 75.0, 0.35),
        SimulationRow::new("Bemidji", 359_600.0, 5_259_500.0, 40.0, 15.0, 0.05),
    ]
}

/// Wrap features in a FeatureCollection.
pub fn feature_collection(features: Vec<Value>) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": features
    })
}

/// An empty FeatureCollection.
pub fn empty_feature_collection() -> Value {
    feature_collection(Vec::new())
}
