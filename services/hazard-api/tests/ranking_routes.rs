//! Router-level tests for the ranking endpoints.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;

use common::{app, app_with_transformer, feature_names, get, path, InMemoryStore};
use hazard_common::{Metric, RankedQuery, SimulationModel, SortDirection};
use test_utils::{assert_approx_eq, empty_feature_collection, reference, SimulationRow};

fn huff_incoming() -> RankedQuery {
    RankedQuery::new(SimulationModel::HuffModel, Metric::Incoming)
}

fn gravity_risk() -> RankedQuery {
    RankedQuery::new(SimulationModel::GravityModel, Metric::Risk)
}

/// Name of the single rank-1 municipality in the sample data.
fn expected_leader(query: RankedQuery) -> &'static str {
    match (query.model, query.metric) {
        (SimulationModel::GravityModel, Metric::Risk) => "Bemidji",
        (_, Metric::Outgoing) => "Saint Paul",
        _ => "Minneapolis",
    }
}

#[tokio::test]
async fn test_ties_at_cutoff_are_all_included() {
    let store = Arc::new(InMemoryStore::with_samples());
    let app = app(store.clone());

    let (status, body) = get(&app, &path(huff_incoming(), "3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "FeatureCollection");

    let names: HashSet<String> = feature_names(&body).into_iter().collect();
    let expected: HashSet<String> = ["Minneapolis", "Saint Paul", "Duluth", "Rochester"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(names, expected);

    let ranks: Vec<u64> = body["features"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["properties"]["rank"].as_u64().unwrap())
        .collect();
    assert_eq!(ranks, vec![1, 2, 3, 3]);
}

#[tokio::test]
async fn test_cutoff_above_a_tie_excludes_it() {
    let store = Arc::new(InMemoryStore::with_samples());
    let app = app(store);

    let (_, body) = get(&app, &path(huff_incoming(), "2")).await;
    assert_eq!(feature_names(&body), vec!["Minneapolis", "Saint Paul"]);
}

#[tokio::test]
async fn test_ascending_tie_on_gravity_risk() {
    let store = Arc::new(InMemoryStore::with_samples());
    let app = app(store);

    let (status, body) = get(&app, &path(gravity_risk(), "3")).await;
    assert_eq!(status, StatusCode::OK);
    let names = feature_names(&body);
    assert_eq!(names.len(), 4);
    assert_eq!(&names[..2], &["Bemidji", "Duluth"]);
    assert!(names.contains(&"Saint Cloud".to_string()));
    assert!(names.contains(&"Mankato".to_string()));
}

#[tokio::test]
async fn test_every_route_ranks_in_its_direction() {
    let store = Arc::new(InMemoryStore::with_samples());
    let app = app(store);

    for query in RankedQuery::all() {
        let (status, body) = get(&app, &path(query, "100")).await;
        assert_eq!(status, StatusCode::OK, "{}", query);

        let features = body["features"].as_array().unwrap();
        assert_eq!(features.len(), 7, "{}", query);
        assert_eq!(feature_names(&body)[0], expected_leader(query), "{}", query);

        let values: Vec<f64> = features
            .iter()
            .map(|f| f["properties"][query.metric.column()].as_f64().unwrap())
            .collect();
        for pair in values.windows(2) {
            match query.direction() {
                SortDirection::Ascending => assert!(pair[0] <= pair[1], "{}: {:?}", query, values),
                SortDirection::Descending => assert!(pair[0] >= pair[1], "{}: {:?}", query, values),
            }
        }
    }
}

#[tokio::test]
async fn test_only_gravity_risk_is_ascending() {
    let store = Arc::new(InMemoryStore::with_samples());
    let app = app(store);

    let (_, gravity) = get(&app, &path(gravity_risk(), "1")).await;
    assert_eq!(feature_names(&gravity), vec!["Bemidji"]);

    let huff_risk = RankedQuery::new(SimulationModel::HuffModel, Metric::Risk);
    let (_, huff) = get(&app, &path(huff_risk, "1")).await;
    assert_eq!(feature_names(&huff), vec!["Minneapolis"]);
}

#[tokio::test]
async fn test_invalid_top_never_reaches_store() {
    let store = Arc::new(InMemoryStore::with_samples());
    let app = app(store.clone());

    for top in ["abc", "-1", "0", "1.5", "99999999999"] {
        let (status, body) = get(&app, &path(huff_incoming(), top)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "top={}", top);
        assert_eq!(body["type"], "ValidationError");
        assert_eq!(body["status"], 400);
    }
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_undecodable_top_is_json_validation_error() {
    let store = Arc::new(InMemoryStore::with_samples());
    let app = app(store.clone());

    // %FF is not valid UTF-8, so the path segment cannot be decoded
    let (status, body) = get(&app, &path(huff_incoming(), "%FF")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["type"], "ValidationError");
    assert_eq!(body["status"], 400);
    assert!(body["detail"].is_string());
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_database_failure_is_500_and_connection_released() {
    let store = Arc::new(
        InMemoryStore::with_samples().failing("relation \"huff_model\" does not exist"),
    );
    let app = app(store.clone());

    let (status, body) = get(&app, &path(huff_incoming(), "5")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["type"], "QueryError");
    assert!(body["detail"].as_str().unwrap().contains("huff_model"));

    assert_eq!(store.calls(), 1);
    assert_eq!(store.open_connections(), 0);
}

#[tokio::test]
async fn test_empty_table_returns_empty_collection() {
    let store = Arc::new(InMemoryStore::with_samples().with_empty_table(SimulationModel::GravityModel));
    let app = app(store);

    let (status, body) = get(&app, &path(gravity_risk(), "10")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, empty_feature_collection());
}

#[tokio::test]
async fn test_every_route_returns_wgs84() {
    let store = Arc::new(InMemoryStore::with_samples());
    let app = app(store);

    for query in RankedQuery::all() {
        let (_, body) = get(&app, &path(query, "100")).await;
        for feature in body["features"].as_array().unwrap() {
            let coords = &feature["geometry"]["coordinates"];
            let lon = coords[0].as_f64().unwrap();
            let lat = coords[1].as_f64().unwrap();
            assert!((-97.5..=-89.0).contains(&lon), "{}: lon {}", query, lon);
            assert!((43.0..=49.5).contains(&lat), "{}: lat {}", query, lat);
        }
    }
}

#[tokio::test]
async fn test_reference_point_reprojection() {
    let (easting, northing, lon, lat) = reference::CENTRAL_MERIDIAN;
    let store = Arc::new(InMemoryStore::with_samples().with_table(
        SimulationModel::HuffModel,
        vec![SimulationRow::new("Reference", easting, northing, 1.0, 1.0, 1.0)],
    ));
    let app = app(store);

    let (_, body) = get(&app, &path(huff_incoming(), "1")).await;
    let coords = &body["features"][0]["geometry"]["coordinates"];
    assert_approx_eq!(coords[0].as_f64().unwrap(), lon, 1e-6);
    assert_approx_eq!(coords[1].as_f64().unwrap(), lat, 1e-6);
    assert_eq!(body["features"][0]["properties"]["name"], "Reference");
}

#[tokio::test]
async fn test_transform_disabled_returns_stored_coordinates() {
    let store = Arc::new(InMemoryStore::with_samples());
    let app = app_with_transformer(store, None);

    let (_, body) = get(&app, &path(huff_incoming(), "1")).await;
    let coords = &body["features"][0]["geometry"]["coordinates"];
    assert_eq!(coords[0].as_f64().unwrap(), 478_500.0);
    assert_eq!(coords[1].as_f64().unwrap(), 4_980_700.0);
}

#[tokio::test]
async fn test_transform_failure_fails_request() {
    // NaN serializes to null, which cannot be reprojected
    let store = Arc::new(InMemoryStore::with_samples().with_table(
        SimulationModel::GravityModel,
        vec![SimulationRow::new("Nowhere", f64::NAN, 5_000_000.0, 1.0, 1.0, 1.0)],
    ));
    let app = app(store.clone());

    let (status, body) = get(&app, &path(gravity_risk(), "1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["type"], "TransformError");
    assert_eq!(store.open_connections(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_are_independent() {
    let store = Arc::new(InMemoryStore::with_samples().with_delay(Duration::from_millis(20)));
    let app = app(store.clone());

    let handles: Vec<_> = RankedQuery::all()
        .enumerate()
        .map(|(i, query)| {
            let app = app.clone();
            let top = (i % 3 + 1).to_string();
            tokio::spawn(async move {
                let (status, body) = get(&app, &path(query, &top)).await;
                (query, status, body)
            })
        })
        .collect();

    for handle in handles {
        let (query, status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK, "{}", query);
        assert_eq!(feature_names(&body)[0], expected_leader(query), "{}", query);
    }

    assert_eq!(store.calls(), 9);
    assert_eq!(store.open_connections(), 0);
}

#[tokio::test]
async fn test_json_content_type() {
    let store = Arc::new(InMemoryStore::with_samples());
    let app = app(store);

    let response = tower::ServiceExt::oneshot(
        app,
        axum::http::Request::builder()
            .uri(path(huff_incoming(), "1"))
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(
        response.headers().get(axum::http::header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
}
