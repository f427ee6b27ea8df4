//! End-to-end tests for the search proxy.
//!
//! Each test starts a fake search cluster and the proxy on random ports and
//! drives the proxy with reqwest, checking both what reaches the cluster
//! and what the caller gets back.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use elastic_proxy::{proxy_router, ElasticClientFactory};
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const HITS: &str = r#"{"took":1,"hits":{"total":{"value":1,"relation":"eq"},"hits":[{"_id":"1"}]}}"#;
const INDEX_MISSING: &str = r#"{"error":{"type":"index_not_found_exception","reason":"no such index [missing]"},"status":404}"#;

/// A request as seen by the fake cluster.
#[derive(Debug, Clone)]
struct Captured {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
}

type Captures = Arc<Mutex<Vec<Captured>>>;

async fn fake_cluster(
    State(captures): State<Captures>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let path = uri.path().to_string();
    captures.lock().unwrap().push(Captured {
        method,
        path: path.clone(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    });

    if path.starts_with("/missing") {
        (StatusCode::NOT_FOUND, INDEX_MISSING)
    } else {
        (StatusCode::OK, HITS)
    }
}

async fn start(router: Router) -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{}", addr), handle)
}

/// Start the fake cluster and the proxy; returns (cluster url, proxy url, captures).
async fn start_stack() -> (String, String, Captures) {
    let captures: Captures = Arc::new(Mutex::new(Vec::new()));
    let cluster = Router::new()
        .fallback(fake_cluster)
        .with_state(captures.clone());
    let (cluster_url, _) = start(cluster).await;
    let (proxy_url, _) = start(proxy_router(Arc::new(ElasticClientFactory))).await;
    (cluster_url, proxy_url, captures)
}

async fn post(proxy_url: &str, body: String) -> (StatusCode, String) {
    let response = Client::new()
        .post(format!("{}/elastic", proxy_url))
        .body(body)
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.text().await.unwrap())
}

#[tokio::test]
async fn test_search_forwarded_with_credentials() {
    let (cluster_url, proxy_url, captures) = start_stack().await;
    let query = json!({"query": {"match": {"title": "rust"}}});
    let body = json!({
        "addresses": cluster_url,
        "username": "elastic",
        "password": "pw",
        "index": "logs-a,logs-b",
        "sort": "ts:desc",
        "size": 0,
        "elasticquery": query,
    });

    let (status, text) = post(&proxy_url, body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    let relayed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(relayed, serde_json::from_str::<Value>(HITS).unwrap());

    let captured = captures.lock().unwrap().clone();
    assert_eq!(captured.len(), 1);
    let seen = &captured[0];
    assert_eq!(seen.method, Method::POST);
    assert_eq!(seen.path, "/logs-a,logs-b/_search");
    assert_eq!(
        seen.query.as_deref(),
        Some("sort=ts%3Adesc&track_total_hits=true&pretty=true&size=0")
    );
    assert_eq!(seen.headers["authorization"], "Basic ZWxhc3RpYzpwdw==");
    assert_eq!(seen.headers["content-type"], "application/json");
    assert_eq!(serde_json::from_slice::<Value>(&seen.body).unwrap(), query);
}

#[tokio::test]
async fn test_search_without_index_hits_root_search() {
    let (cluster_url, proxy_url, captures) = start_stack().await;
    let body = json!({"addresses": cluster_url, "size": 10});

    let (status, _) = post(&proxy_url, body.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let captured = captures.lock().unwrap().clone();
    assert_eq!(captured[0].path, "/_search");
    assert_eq!(
        captured[0].query.as_deref(),
        Some("track_total_hits=true&pretty=true&size=10")
    );
    assert!(!captured[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_remote_error_body_passed_through() {
    let (cluster_url, proxy_url, _) = start_stack().await;
    let body = json!({"addresses": cluster_url, "index": "missing"});

    let (status, text) = post(&proxy_url, body.to_string()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(text, INDEX_MISSING);
}

#[tokio::test]
async fn test_unreachable_cluster_is_400() {
    let (_, proxy_url, _) = start_stack().await;
    let closed = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let body = json!({"addresses": format!("http://{}", closed)});

    let (status, text) = post(&proxy_url, body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!text.is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let (_, proxy_url, captures) = start_stack().await;

    let (status, text) = post(&proxy_url, "{\"size\":".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!text.is_empty());
    assert!(captures.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_environment_discovery() {
    let (cluster_url, proxy_url, captures) = start_stack().await;
    // The only test that touches ELASTICSEARCH_URL, so the variable is not raced.
    std::env::set_var("ELASTICSEARCH_URL", &cluster_url);

    // No connection fields at all: default client, no credentials.
    let body = json!({"index": "logs", "elasticquery": {"size": 1}});
    let (status, _) = post(&proxy_url, body.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    // Credentials without addresses: discovered cluster, credentials kept.
    let body = json!({"username": "elastic", "password": "pw", "index": "secure"});
    let (status, _) = post(&proxy_url, body.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let captured = captures.lock().unwrap().clone();
    assert_eq!(captured.len(), 2);
    assert_eq!(captured[0].path, "/logs/_search");
    assert!(!captured[0].headers.contains_key("authorization"));
    assert_eq!(captured[1].path, "/secure/_search");
    assert_eq!(captured[1].headers["authorization"], "Basic ZWxhc3RpYzpwdw==");
}
