//! Application state for the Hazard API.

use std::sync::Arc;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use projection::CoordinateTransformer;
use storage::{DatabaseConfig, RankingCatalog, RankingStore};

use crate::config::TransformConfig;
use crate::metrics::MetricsCollector;

/// Shared application state.
///
/// Everything here is immutable after startup apart from the metric
/// counters; each request borrows its own pooled connection via `store`.
pub struct AppState {
    /// Ranked results backend.
    pub store: Arc<dyn RankingStore>,

    /// Output reprojection, `None` when disabled.
    pub transformer: Option<CoordinateTransformer>,

    /// Request counters.
    pub metrics: MetricsCollector,

    /// Prometheus render handle, when a recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Create state around an existing store.
    pub fn new(store: Arc<dyn RankingStore>, transformer: Option<CoordinateTransformer>) -> Self {
        Self {
            store,
            transformer,
            metrics: MetricsCollector::new(),
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    /// Create state from environment configuration.
    ///
    /// The connection pool is created lazily, so startup succeeds while the
    /// database is unreachable; `/ready` reports it.
    pub fn from_env() -> Result<Self> {
        let db_config = DatabaseConfig::from_env().context("Invalid database configuration")?;
        let transform_config =
            TransformConfig::from_env().context("Invalid transform configuration")?;

        let transformer = transform_config
            .build_transformer()
            .context("Unsupported output transformation")?;

        info!(
            host = %db_config.host,
            port = db_config.port,
            database = %db_config.database,
            max_connections = db_config.max_connections,
            "Configured results database"
        );
        match &transformer {
            Some(t) => info!(source = %t.source_crs(), target = %t.target_crs(), "Output reprojection enabled"),
            None => info!("Output reprojection disabled"),
        }

        let catalog = RankingCatalog::connect_lazy(&db_config);

        Ok(Self::new(Arc::new(catalog), transformer))
    }
}
