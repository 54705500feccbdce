//! Common types shared across the hazard ranking crates.

pub mod crs;
pub mod error;
pub mod limit;
pub mod model;

pub use crs::{CrsCode, CrsParseError};
pub use error::{HazardError, HazardResult};
pub use limit::Limit;
pub use model::{Metric, RankedQuery, SimulationModel, SortDirection};
