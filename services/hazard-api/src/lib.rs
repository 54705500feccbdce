//! Hazard API Service Library
//!
//! HTTP server exposing ranked results of the BMSB spread simulations
//! (Huff, Huff with distance decay, Gravity) as GeoJSON.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod state;

pub use routes::{build_router, API_PREFIX};
pub use state::AppState;
