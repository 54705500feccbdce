//! Storage layer for the hazard ranking services.
//!
//! Provides:
//! - The fixed catalog of ranking statements
//! - PostgreSQL access to the simulation results tables
//! - Database configuration loaded from the environment

pub mod catalog;
pub mod config;
pub mod queries;

pub use catalog::{normalize_document, RankingCatalog, RankingStore};
pub use config::DatabaseConfig;
pub use queries::{ranking_sql, QueryCatalog};
