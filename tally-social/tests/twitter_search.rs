use serde_json::json;
use tally_http::HttpError;
use tally_social::{Recency, SearchClient, SearchError, TwitterApi};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn api_for(server: &MockServer) -> TwitterApi {
    TwitterApi::with_base_url(&server.uri(), "test-bearer".to_string()).unwrap()
}

#[tokio::test]
async fn search_returns_post_texts_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .and(query_param("query", "cloud"))
        .and(query_param("max_results", "100"))
        .and(query_param("sort_order", "recency"))
        .and(header("authorization", "Bearer test-bearer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": "1", "text": "IBM and IBM again"},
                {"id": "2", "text": "Acme launches a cloud"}
            ],
            "meta": {"result_count": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let texts = api_for(&server)
        .await
        .search("cloud", 100, Recency::Recent)
        .await
        .unwrap();

    assert_eq!(texts, vec!["IBM and IBM again", "Acme launches a cloud"]);
}

#[tokio::test]
async fn empty_result_page_yields_no_texts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"result_count": 0}
        })))
        .mount(&server)
        .await;

    let texts = api_for(&server)
        .await
        .search("nothing-matches", 50, Recency::Mixed)
        .await
        .unwrap();
    assert!(texts.is_empty());
}

#[tokio::test]
async fn results_are_truncated_to_the_requested_limit() {
    let server = MockServer::start().await;
    let data: Vec<_> = (0..10)
        .map(|i| json!({"id": i.to_string(), "text": format!("post {i}")}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .and(query_param("max_results", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
        .mount(&server)
        .await;

    let texts = api_for(&server)
        .await
        .search("rust", 3, Recency::Popular)
        .await
        .unwrap();
    assert_eq!(texts, vec!["post 0", "post 1", "post 2"]);
}

#[tokio::test]
async fn upstream_failures_surface_as_search_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "title": "Unauthorized",
            "detail": "Unauthorized",
            "status": 401
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = api_for(&server)
        .await
        .search("cloud", 100, Recency::Recent)
        .await
        .unwrap_err();

    match err {
        SearchError::Http(HttpError::Api { status, .. }) => assert_eq!(status.as_u16(), 401),
        other => panic!("expected HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn blank_keyword_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = api_for(&server)
        .await
        .search("  ", 100, Recency::Recent)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::InvalidQuery(_)));
}
