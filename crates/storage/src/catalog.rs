//! Ranking results catalog using PostgreSQL.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, error, warn};

use hazard_common::{HazardError, HazardResult, Limit, RankedQuery};

use crate::config::DatabaseConfig;
use crate::queries::QueryCatalog;

/// Pause before retrying a transient failure, multiplied by the attempt number.
const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Postgres error code raised when `statement_timeout` cancels a query.
const QUERY_CANCELED: &str = "57014";

/// Read access to ranked simulation results.
#[async_trait]
pub trait RankingStore: Send + Sync {
    /// Run the catalog statement for `query`, returning a FeatureCollection of
    /// every row ranked at or above `limit`.
    async fn top_ranked(&self, query: RankedQuery, limit: Limit) -> HazardResult<Value>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> HazardResult<()>;
}

/// Database connection pool and ranking queries.
pub struct RankingCatalog {
    pool: PgPool,
    queries: QueryCatalog,
    query_timeout: Duration,
    /// Bound on a whole `top_ranked` call, retries included
    deadline: Duration,
    max_retries: u32,
}

impl RankingCatalog {
    /// Connect eagerly, failing if the database cannot be reached.
    pub async fn connect(config: &DatabaseConfig) -> HazardResult<Self> {
        let pool = pool_options(config)
            .connect_with(connect_options(config))
            .await
            .map_err(|e| HazardError::Unavailable(format!("Connection failed: {}", e)))?;

        Ok(Self::with_pool(pool, config))
    }

    /// Create the pool without opening a connection.
    ///
    /// Connections are established on first use, so the service can start
    /// while the database is down and report it through readiness checks.
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        let pool = pool_options(config).connect_lazy_with(connect_options(config));
        Self::with_pool(pool, config)
    }

    pub fn with_pool(pool: PgPool, config: &DatabaseConfig) -> Self {
        Self {
            pool,
            queries: QueryCatalog::new(),
            query_timeout: config.query_timeout,
            deadline: config.acquire_timeout + config.query_timeout,
            max_retries: config.max_retries,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close all pooled connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Retry transient failures with linear backoff.
    async fn run_with_retry(&self, query: RankedQuery, limit: Limit) -> HazardResult<Value> {
        let started = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            match self.run_once(query, limit).await {
                Ok(document) => {
                    debug!(
                        query = %query,
                        limit = limit.get(),
                        attempts = attempt + 1,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Ranking query completed"
                    );
                    return Ok(normalize_document(document));
                }
                Err(e) if is_transient(&e) && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(query = %query, attempt, error = %e, "Transient database error, retrying");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                Err(e) => {
                    error!(query = %query, limit = limit.get(), error = %e, "Ranking query failed");
                    return Err(map_sqlx_error(e));
                }
            }
        }
    }

    /// One attempt: borrow a connection, run the statement in a read-only
    /// transaction and commit, or roll back on failure.
    async fn run_once(&self, query: RankedQuery, limit: Limit) -> Result<Option<Value>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        match self.fetch_document(&mut tx, query, limit).await {
            Ok(document) => {
                tx.commit().await?;
                Ok(document)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed; connection will be discarded");
                }
                Err(e)
            }
        }
    }

    async fn fetch_document(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        query: RankedQuery,
        limit: Limit,
    ) -> Result<Option<Value>, sqlx::Error> {
        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut **tx)
            .await?;

        // Transaction-local, so it never leaks to the next borrower of the connection
        sqlx::query("SELECT set_config('statement_timeout', $1, true)")
            .bind(self.query_timeout.as_millis().to_string())
            .execute(&mut **tx)
            .await?;

        sqlx::query_scalar::<_, Option<Value>>(self.queries.get(query))
            .bind(limit.as_i64())
            .fetch_one(&mut **tx)
            .await
    }
}

#[async_trait]
impl RankingStore for RankingCatalog {
    async fn top_ranked(&self, query: RankedQuery, limit: Limit) -> HazardResult<Value> {
        // One deadline covers every attempt and backoff pause
        match tokio::time::timeout(self.deadline, self.run_with_retry(query, limit)).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    query = %query,
                    limit = limit.get(),
                    deadline_ms = self.deadline.as_millis() as u64,
                    "Ranking query exceeded its deadline"
                );
                Err(HazardError::Timeout)
            }
        }
    }

    async fn ping(&self) -> HazardResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(map_sqlx_error)
    }
}

fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database)
        .application_name("hazard-api")
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
}

/// Failures worth another attempt; every catalog statement is read-only.
fn is_transient(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::PoolTimedOut | sqlx::Error::Io(_))
}

/// Translate a driver error into the service error taxonomy.
pub fn map_sqlx_error(err: sqlx::Error) -> HazardError {
    match err {
        sqlx::Error::PoolTimedOut => {
            HazardError::Unavailable("timed out waiting for a database connection".to_string())
        }
        sqlx::Error::PoolClosed => {
            HazardError::Unavailable("connection pool is closed".to_string())
        }
        sqlx::Error::Database(db) if db.code().as_deref() == Some(QUERY_CANCELED) => {
            HazardError::Timeout
        }
        other => HazardError::Query(other.to_string()),
    }
}

/// Canonical form of a fetched document.
///
/// A NULL aggregate, or a `features` value of NULL, becomes an empty
/// FeatureCollection. Anything else passes through unchanged.
pub fn normalize_document(document: Option<Value>) -> Value {
    match document {
        None | Some(Value::Null) => json!({"type": "FeatureCollection", "features": []}),
        Some(mut doc) => {
            if let Some(features) = doc.get_mut("features") {
                if features.is_null() {
                    *features = Value::Array(Vec::new());
                }
            }
            doc
        }
    }
}
