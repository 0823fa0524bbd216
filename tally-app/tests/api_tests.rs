//! Router-level tests: status codes and JSON body shapes.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{pipeline, Extraction, FakeExtractor, FakeSearch};
use serde_json::{json, Value};
use std::sync::Arc;
use tally_app::{build_router, AppState};
use tower::util::ServiceExt;

fn setup_app(search: &Arc<FakeSearch>, extractor: &Arc<FakeExtractor>) -> axum::Router {
    build_router(AppState::new(pipeline(search, extractor)))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let search = FakeSearch::returning(["x"]);
    let extractor = FakeExtractor::new(Extraction::Annotated(vec![]));
    let app = setup_app(&search, &extractor);

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "tally");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn analyze_returns_labels_and_counts() {
    let search = FakeSearch::returning(["IBM IBM", "Acme"]);
    let extractor = FakeExtractor::annotating([vec!["ibm", "ibm"], vec!["acme"]]);
    let app = setup_app(&search, &extractor);

    let response = app.oneshot(get("/analyze/cloud/companies")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body, json!({"labels": ["ibm", "acme"], "response": [2, 1]}));
}

#[tokio::test]
async fn analyze_decodes_percent_encoded_keywords() {
    let search = FakeSearch::returning(["x"]);
    let extractor = FakeExtractor::annotating([vec!["Jane"]]);
    let app = setup_app(&search, &extractor);

    let response = app
        .oneshot(get("/analyze/cloud%20computing/people"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (keyword, _, _) = search.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(keyword, "cloud computing");
}

#[tokio::test]
async fn empty_search_gives_empty_histogram() {
    let search = FakeSearch::returning(Vec::<String>::new());
    let extractor = FakeExtractor::new(Extraction::Annotated(vec![]));
    let app = setup_app(&search, &extractor);

    let response = app.oneshot(get("/analyze/quiet/people")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body, json!({"labels": [], "response": []}));
}

#[tokio::test]
async fn unknown_option_is_a_bad_request_with_error_body() {
    let search = FakeSearch::returning(["x"]);
    let extractor = FakeExtractor::annotating([vec!["x"]]);
    let app = setup_app(&search, &extractor);

    let response = app.oneshot(get("/analyze/cloud/widgets")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    let message = body["error"].as_str().expect("error string");
    assert!(message.starts_with("no service endpoint configured"), "{message}");
    assert_eq!(extractor.calls(), 0);
}

#[tokio::test]
async fn upstream_status_is_echoed_in_error_body() {
    let search = FakeSearch::returning(["x"]);
    let extractor = FakeExtractor::new(Extraction::Status(500));
    let app = setup_app(&search, &extractor);

    let response = app.oneshot(get("/analyze/cloud/companies")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body, json!({"error": "Status code: 500"}));
}

#[tokio::test]
async fn missing_endpoint_is_a_server_error() {
    let search = FakeSearch::returning(["x"]);
    let extractor = FakeExtractor::new(Extraction::MissingEndpoint);
    let app = setup_app(&search, &extractor);

    let response = app.oneshot(get("/analyze/cloud/people")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = extract_json(response.into_body()).await;
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("no service endpoint configured")
    );
}

#[tokio::test]
async fn search_failure_is_a_bad_gateway() {
    let search = FakeSearch::failing();
    let extractor = FakeExtractor::annotating([vec!["x"]]);
    let app = setup_app(&search, &extractor);

    let response = app.oneshot(get("/analyze/cloud/companies")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().starts_with("search failed"));
    assert_eq!(extractor.calls(), 0);
}

#[tokio::test]
async fn missing_path_segment_is_not_routed() {
    let search = FakeSearch::returning(["x"]);
    let extractor = FakeExtractor::new(Extraction::Annotated(vec![]));
    let app = setup_app(&search, &extractor);

    let response = app.oneshot(get("/analyze/cloud")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
