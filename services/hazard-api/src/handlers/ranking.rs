//! Ranked results handler shared by all nine catalog routes.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::PathRejection, Path},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::debug;

use hazard_common::{HazardError, HazardResult, Limit, RankedQuery};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/v1/{model}/{metric}/{top}
///
/// The limit is validated before the store is touched. On success the body
/// is the store's FeatureCollection, reprojected when a transformer is
/// configured. A segment axum cannot decode is a validation error too.
pub async fn ranking_handler(
    state: Arc<AppState>,
    query: RankedQuery,
    top: Result<Path<String>, PathRejection>,
) -> Response {
    let started = Instant::now();

    let result = match top {
        Ok(Path(top)) => fetch_ranked(&state, query, &top).await,
        Err(rejection) => Err(HazardError::InvalidLimit(rejection.body_text())),
    };

    match result {
        Ok(document) => {
            let features = feature_count(&document);
            state
                .metrics
                .record_success(query, features, started.elapsed());
            debug!(
                query = %query,
                features,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Served ranking"
            );
            Json(document).into_response()
        }
        Err(e) => {
            state
                .metrics
                .record_failure(query, e.kind(), e.is_client_error());
            ApiError(e).into_response()
        }
    }
}

async fn fetch_ranked(state: &AppState, query: RankedQuery, top: &str) -> HazardResult<Value> {
    let limit = Limit::parse(top)?;

    let mut document = state.store.top_ranked(query, limit).await?;

    if let Some(transformer) = &state.transformer {
        transformer.transform_collection(&mut document)?;
    }

    Ok(document)
}

fn feature_count(document: &Value) -> usize {
    document
        .get("features")
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}
