//! In-memory ranking store and request helpers for router tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use hazard_api::{build_router, AppState};
use hazard_common::{HazardError, HazardResult, Limit, Metric, RankedQuery, SimulationModel, SortDirection};
use projection::CoordinateTransformer;
use storage::RankingStore;
use test_utils::{feature_collection, sample_rows, SimulationRow};

/// Ranking store backed by fixture rows, with the same RANK() semantics as
/// the SQL catalog.
pub struct InMemoryStore {
    tables: HashMap<SimulationModel, Vec<SimulationRow>>,
    failure: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    open_connections: AtomicUsize,
}

/// Stands in for a pooled connection; released on every exit path.
struct ConnectionGuard<'a>(&'a AtomicUsize);

impl<'a> ConnectionGuard<'a> {
    fn acquire(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for ConnectionGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl InMemoryStore {
    /// Every model table holds the sample municipalities.
    pub fn with_samples() -> Self {
        let tables = SimulationModel::ALL
            .into_iter()
            .map(|model| (model, sample_rows()))
            .collect();
        Self {
            tables,
            failure: None,
            delay: None,
            calls: AtomicUsize::new(0),
            open_connections: AtomicUsize::new(0),
        }
    }

    pub fn with_empty_table(mut self, model: SimulationModel) -> Self {
        self.tables.insert(model, Vec::new());
        self
    }

    pub fn with_table(mut self, model: SimulationModel, rows: Vec<SimulationRow>) -> Self {
        self.tables.insert(model, rows);
        self
    }

    /// Every query fails with a database error carrying `message`.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn open_connections(&self) -> usize {
        self.open_connections.load(Ordering::SeqCst)
    }
}

fn metric_value(row: &SimulationRow, metric: Metric) -> f64 {
    match metric {
        Metric::Incoming => row.incoming,
        Metric::Outgoing => row.outgoing,
        Metric::Risk => row.risk,
    }
}

/// Rows with their RANK() for `query`: ties share a rank, the next rank is
/// skipped.
pub fn ranked_rows(rows: &[SimulationRow], query: RankedQuery) -> Vec<(u64, SimulationRow)> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| {
        let (x, y) = (metric_value(a, query.metric), metric_value(b, query.metric));
        match query.direction() {
            SortDirection::Ascending => x.total_cmp(&y),
            SortDirection::Descending => y.total_cmp(&x),
        }
    });

    let mut ranked: Vec<(u64, SimulationRow)> = Vec::with_capacity(sorted.len());
    for (i, row) in sorted.into_iter().enumerate() {
        let rank = match ranked.last() {
            Some((prev_rank, prev)) if metric_value(prev, query.metric) == metric_value(&row, query.metric) => {
                *prev_rank
            }
            _ => i as u64 + 1,
        };
        ranked.push((rank, row));
    }
    ranked
}

#[async_trait]
impl RankingStore for InMemoryStore {
    async fn top_ranked(&self, query: RankedQuery, limit: Limit) -> HazardResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _conn = ConnectionGuard::acquire(&self.open_connections);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(HazardError::Query(message.clone()));
        }

        let rows = self.tables.get(&query.model).cloned().unwrap_or_default();
        let features = ranked_rows(&rows, query)
            .into_iter()
            .filter(|(rank, _)| *rank <= u64::from(limit.get()))
            .map(|(rank, row)| row.to_feature(rank))
            .collect();

        Ok(feature_collection(features))
    }

    async fn ping(&self) -> HazardResult<()> {
        match &self.failure {
            Some(message) => Err(HazardError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }
}

/// Router over `store` with the default UTM 15N -> WGS84 reprojection.
pub fn app(store: Arc<InMemoryStore>) -> Router {
    app_with_transformer(store, Some(CoordinateTransformer::default()))
}

pub fn app_with_transformer(
    store: Arc<InMemoryStore>,
    transformer: Option<CoordinateTransformer>,
) -> Router {
    build_router(Arc::new(AppState::new(store, transformer)))
}

/// Send a GET and return status plus parsed JSON body (Null when not JSON).
pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn feature_names(body: &Value) -> Vec<String> {
    body["features"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["properties"]["name"].as_str().unwrap().to_string())
        .collect()
}

pub fn path(query: RankedQuery, top: &str) -> String {
    format!(
        "/api/v1/{}/{}/{}",
        query.model.path_segment(),
        query.metric.path_segment(),
        top
    )
}
