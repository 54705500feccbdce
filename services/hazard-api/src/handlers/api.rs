//! Landing page, API description and unmatched-route handling.

use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

use hazard_common::{HazardError, Metric, RankedQuery, SimulationModel};

use crate::error::ApiError;
use crate::routes::API_PREFIX;

pub const API_TITLE: &str = "Minnesota BMSB Spread Simulation & Hazard Analysis API";

const TOP_DESCRIPTION: &str = "The number of top ranked results that will be returned.";

/// GET /api/v1 - Landing document
pub async fn landing_handler() -> Json<Value> {
    let links: Vec<Value> = RankedQuery::all()
        .map(|query| {
            json!({
                "href": format!("{}{}", API_PREFIX, query.display_path()),
                "rel": "data",
                "title": summary(query),
            })
        })
        .chain([json!({
            "href": format!("{}/doc", API_PREFIX),
            "rel": "service-desc",
            "type": "application/openapi+json;version=3.0",
            "title": "API definition",
        })])
        .collect();

    Json(json!({
        "title": API_TITLE,
        "version": env!("CARGO_PKG_VERSION"),
        "links": links,
    }))
}

/// GET /api/v1/doc - OpenAPI definition
pub async fn openapi_handler() -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/openapi+json;version=3.0"),
            (header::CACHE_CONTROL, "max-age=3600"),
        ],
        openapi_document().to_string(),
    )
        .into_response()
}

/// Anything no route matched.
///
/// Paths under the API prefix are checked segment by segment so clients
/// learn whether the model or the metric was wrong.
pub async fn fallback_handler(uri: Uri) -> Response {
    ApiError(classify_unmatched(uri.path())).into_response()
}

fn classify_unmatched(path: &str) -> HazardError {
    let not_found = || HazardError::NotFound(path.to_string());

    let Some(rest) = path.strip_prefix(API_PREFIX) else {
        return not_found();
    };
    let mut segments = rest.split('/').filter(|s| !s.is_empty());

    let Some(model) = segments.next() else {
        return not_found();
    };
    if let Err(e) = model.parse::<SimulationModel>() {
        return e;
    }

    match segments.next().map(str::parse::<Metric>) {
        Some(Err(e)) => e,
        _ => not_found(),
    }
}

fn summary(query: RankedQuery) -> String {
    let metric = match query.metric {
        Metric::Incoming => "incoming",
        Metric::Outgoing => "outgoing",
        Metric::Risk => "risk probability",
    };
    let model = match query.model {
        SimulationModel::HuffModel => "Huff Model",
        SimulationModel::HuffModelWithDistanceDecay => "Huff Model (with Distance Decay)",
        SimulationModel::GravityModel => "Gravity Model",
    };
    format!("Top ranked municipalities by {} from the {} simulation", metric, model)
}

/// OpenAPI 3.0 description built from the ranking catalog.
pub fn openapi_document() -> Value {
    let mut paths = Map::new();

    for query in RankedQuery::all() {
        let operation = json!({
            "get": {
                "tags": [query.model.path_segment()],
                "summary": summary(query),
                "operationId": format!("{}_{}", query.model.path_segment(), query.metric.path_segment()),
                "parameters": [{
                    "name": "top",
                    "in": "path",
                    "required": true,
                    "description": TOP_DESCRIPTION,
                    "schema": {"type": "integer", "minimum": 1}
                }],
                "responses": {
                    "200": {
                        "description": "GeoJSON FeatureCollection of every municipality ranked at or above `top`",
                        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/FeatureCollection"}}}
                    },
                    "400": error_response_ref("`top` is not a positive integer"),
                    "500": error_response_ref("Query or coordinate transformation failed"),
                    "503": error_response_ref("Database unavailable"),
                    "504": error_response_ref("Query timed out")
                }
            }
        });
        paths.insert(format!("{}{}", API_PREFIX, query.display_path()), operation);
    }

    let tags: Vec<Value> = SimulationModel::ALL
        .iter()
        .map(|model| json!({"name": model.path_segment(), "description": model.description()}))
        .collect();

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": API_TITLE,
            "version": env!("CARGO_PKG_VERSION"),
        },
        "tags": tags,
        "paths": paths,
        "components": {
            "schemas": {
                "FeatureCollection": {
                    "type": "object",
                    "required": ["type", "features"],
                    "properties": {
                        "type": {"type": "string", "enum": ["FeatureCollection"]},
                        "features": {"type": "array", "items": {"type": "object"}}
                    }
                },
                "Exception": {
                    "type": "object",
                    "properties": {
                        "type": {"type": "string"},
                        "title": {"type": "string"},
                        "status": {"type": "integer"},
                        "detail": {"type": "string"}
                    }
                }
            }
        }
    })
}

fn error_response_ref(description: &str) -> Value {
    json!({
        "description": description,
        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Exception"}}}
    })
}
