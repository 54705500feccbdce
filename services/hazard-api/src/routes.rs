//! Router construction.

use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path},
    routing::get,
    Extension, Router,
};

use hazard_common::RankedQuery;

use crate::handlers;
use crate::state::AppState;

/// Versioned prefix shared by every API route.
pub const API_PREFIX: &str = "/api/v1";

/// One GET route per catalog entry, all served by the same handler.
pub fn ranking_routes() -> Router {
    RankedQuery::all().fold(Router::new(), |router, query| {
        router.route(
            &query.route_path(),
            get(
                move |Extension(state): Extension<Arc<AppState>>,
                      top: Result<Path<String>, PathRejection>| async move {
                    handlers::ranking::ranking_handler(state, query, top).await
                },
            ),
        )
    })
}

/// Full application router without transport middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = ranking_routes()
        .route("/", get(handlers::api::landing_handler))
        .route("/doc", get(handlers::api::openapi_handler));

    Router::new()
        .nest(API_PREFIX, api)
        .route("/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        .fallback(handlers::api::fallback_handler)
        .layer(Extension(state))
}
