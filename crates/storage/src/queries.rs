//! Fixed catalog of ranking statements, one per (model, metric) pair.
//!
//! Each statement ranks a model table with `RANK()` (ties share a rank and
//! the following ranks are skipped), keeps rows with rank <= `$1`, and
//! aggregates them server-side into a single GeoJSON FeatureCollection.
//! Table, column and direction come from enums only; the limit is always a
//! bound parameter.

use hazard_common::{Metric, RankedQuery, SimulationModel};

/// Build the ranking statement for one catalog entry.
///
/// `json_agg` over zero rows yields NULL, so the features array is coalesced
/// to `[]` and an empty table produces an empty FeatureCollection.
pub fn ranking_sql(query: RankedQuery) -> String {
    format!(
        "SELECT json_build_object(\
         'type', 'FeatureCollection', \
         'features', COALESCE(json_agg(ST_AsGeoJSON(rankings.*)::json), '[]'::json)) \
         FROM (\
         SELECT *, RANK() OVER (ORDER BY {column} {direction}) AS rank \
         FROM {table}\
         ) AS rankings \
         WHERE rank <= $1",
        column = query.metric.column(),
        direction = query.direction().as_sql(),
        table = query.model.table_name(),
    )
}

/// Prebuilt statements for all nine catalog entries, indexed by
/// `[model][metric]`.
#[derive(Debug, Clone)]
pub struct QueryCatalog {
    statements: [[String; 3]; 3],
}

impl QueryCatalog {
    pub fn new() -> Self {
        let statements = SimulationModel::ALL.map(|model| {
            Metric::ALL.map(|metric| ranking_sql(RankedQuery::new(model, metric)))
        });
        Self { statements }
    }

    /// Statement for a catalog entry.
    pub fn get(&self, query: RankedQuery) -> &str {
        &self.statements[model_slot(query.model)][metric_slot(query.metric)]
    }

    pub fn len(&self) -> usize {
        self.statements.iter().map(|row| row.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Slots follow the order of `SimulationModel::ALL` and `Metric::ALL`.
fn model_slot(model: SimulationModel) -> usize {
    match model {
        SimulationModel::HuffModel => 0,
        SimulationModel::HuffModelWithDistanceDecay => 1,
        SimulationModel::GravityModel => 2,
    }
}

fn metric_slot(metric: Metric) -> usize {
    match metric {
        Metric::Incoming => 0,
        Metric::Outgoing => 1,
        Metric::Risk => 2,
    }
}

impl Default for QueryCatalog {
    fn default() -> Self {
        Self::new()
    }
}
