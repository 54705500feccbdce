//! Simulation models, ranking metrics and their combinations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HazardError;

/// Spatial-interaction model whose precomputed results are served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulationModel {
    HuffModel,
    HuffModelWithDistanceDecay,
    GravityModel,
}

impl SimulationModel {
    pub const ALL: [SimulationModel; 3] = [
        SimulationModel::HuffModel,
        SimulationModel::HuffModelWithDistanceDecay,
        SimulationModel::GravityModel,
    ];

    /// Backing table holding this model's results.
    pub fn table_name(&self) -> &'static str {
        match self {
            SimulationModel::HuffModel => "huff_model",
            SimulationModel::HuffModelWithDistanceDecay => "huff_model_distance_decay",
            SimulationModel::GravityModel => "gravity_model",
        }
    }

    /// Segment used in request paths (`/huffmodel/...`).
    pub fn path_segment(&self) -> &'static str {
        match self {
            SimulationModel::HuffModel => "huffmodel",
            SimulationModel::HuffModelWithDistanceDecay => "huffmodelwithdistancedecay",
            SimulationModel::GravityModel => "gravitymodel",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SimulationModel::HuffModel => {
                "Operations for accessing results of the Huff Model Simulation."
            }
            SimulationModel::HuffModelWithDistanceDecay => {
                "Operations for accessing results of the Huff Model (with Distance Decay) Simulation."
            }
            SimulationModel::GravityModel => {
                "Operations for accessing results of the Gravity Model Simulation."
            }
        }
    }
}

impl fmt::Display for SimulationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for SimulationModel {
    type Err = HazardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.path_segment().eq_ignore_ascii_case(s))
            .ok_or_else(|| HazardError::UnknownModel(s.to_string()))
    }
}

/// Ranking dimension within a model's results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Incoming,
    Outgoing,
    Risk,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Incoming, Metric::Outgoing, Metric::Risk];

    /// Canonical column name.
    ///
    /// Source tables mix `Incoming` and `incoming`; Postgres folds unquoted
    /// identifiers to lower case, so the lower-case form addresses both.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Incoming => "incoming",
            Metric::Outgoing => "outgoing",
            Metric::Risk => "risk",
        }
    }

    /// Segment used in request paths. Risk is published as `probability`.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Metric::Incoming => "incoming",
            Metric::Outgoing => "outgoing",
            Metric::Risk => "probability",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for Metric {
    type Err = HazardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "incoming" => Ok(Metric::Incoming),
            "outgoing" => Ok(Metric::Outgoing),
            "probability" | "risk" => Ok(Metric::Risk),
            _ => Err(HazardError::UnknownMetric(s.to_string())),
        }
    }
}

/// Ordering applied to the ranking column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// One entry of the ranking catalog: a model paired with a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RankedQuery {
    pub model: SimulationModel,
    pub metric: Metric,
}

impl RankedQuery {
    pub const fn new(model: SimulationModel, metric: Metric) -> Self {
        Self { model, metric }
    }

    /// Every (model, metric) combination, model-major.
    pub fn all() -> impl Iterator<Item = RankedQuery> {
        SimulationModel::ALL.into_iter().flat_map(|model| {
            Metric::ALL
                .into_iter()
                .map(move |metric| RankedQuery::new(model, metric))
        })
    }

    /// Rank 1 is the "top" row. Lower gravity-model risk ranks first; every
    /// other combination ranks the largest value first.
    pub fn direction(&self) -> SortDirection {
        match (self.model, self.metric) {
            (SimulationModel::GravityModel, Metric::Risk) => SortDirection::Ascending,
            _ => SortDirection::Descending,
        }
    }

    /// Route path relative to the API prefix, with `top` as the trailing segment.
    pub fn route_path(&self) -> String {
        format!(
            "/{}/{}/:top",
            self.model.path_segment(),
            self.metric.path_segment()
        )
    }

    /// Human-readable path (`/gravitymodel/probability/{top}`).
    pub fn display_path(&self) -> String {
        format!(
            "/{}/{}/{{top}}",
            self.model.path_segment(),
            self.metric.path_segment()
        )
    }
}

impl fmt::Display for RankedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.model, self.metric)
    }
}
