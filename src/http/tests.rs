//! Tests for the HTTP module

use super::*;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::query::{build, Query};
use crate::types::BackoffType;
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use test_case::test_case;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpClient {
    let config = ClientConfig::builder()
        .base_url(format!("{}/resource", server.uri()))
        .build();
    HttpClient::from_config(&config).unwrap()
}

fn client_with_token(server: &MockServer, token: &str) -> HttpClient {
    let config = ClientConfig::builder()
        .base_url(format!("{}/resource", server.uri()))
        .app_token(token)
        .build();
    HttpClient::from_config(&config).unwrap()
}

// ============================================================================
// URL Tests
// ============================================================================

#[test]
fn test_dataset_url() {
    let config = ClientConfig::builder()
        .base_url("https://data.cityofchicago.org/resource/")
        .build();
    let client = HttpClient::from_config(&config).unwrap();

    assert_eq!(
        client.dataset_url("ijzp-q8t2").unwrap().as_str(),
        "https://data.cityofchicago.org/resource/ijzp-q8t2.json"
    );
}

#[test]
fn test_dataset_url_escapes_segment() {
    let client = HttpClient::from_config(&ClientConfig::default()).unwrap();
    let url = client.dataset_url("a/b").unwrap();
    assert!(url.as_str().ends_with("/resource/a%2Fb.json"));
}

#[test]
fn test_dataset_url_rejects_empty_id() {
    let client = HttpClient::from_config(&ClientConfig::default()).unwrap();
    assert!(matches!(
        client.dataset_url(" "),
        Err(Error::InvalidConfigValue { .. })
    ));
}

#[test]
fn test_from_config_bad_token() {
    let config = ClientConfig::builder().app_token("bad\ntoken").build();
    assert!(HttpClient::from_config(&config).is_err());
}

#[test]
fn test_http_client_debug_hides_token() {
    let config = ClientConfig::builder().app_token("hidden").build();
    let client = HttpClient::from_config(&config).unwrap();
    let debug = format!("{client:?}");
    assert!(debug.contains("has_app_token: true"));
    assert!(!debug.contains("hidden"));
}

// ============================================================================
// Fetch Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_page_sends_params_and_accept() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/resource/ijzp-q8t2.json"))
        .and(query_param("$where", "x > 1"))
        .and(query_param("$limit", "50"))
        .and(query_param("$offset", "100"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "1", "primary_type": "THEFT"},
            {"id": "2", "primary_type": "BATTERY"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let query = Query::builder().filter("x > 1").build();
    let rows = client
        .fetch_page("ijzp-q8t2", &build(&query, 50, 100))
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["primary_type"], "THEFT");
    assert_eq!(rows[1]["id"], "2");
}

#[tokio::test]
async fn test_fetch_page_omits_absent_clauses() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/resource/abcd-1234.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    client
        .fetch_page("abcd-1234", &build(&Query::new(), 10, 0))
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let url = &requests[0].url;
    let keys: Vec<String> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
    assert_eq!(keys, vec!["$limit", "$offset"]);
}

#[tokio::test]
async fn test_fetch_page_with_app_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("X-App-Token", "token-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_with_token(&mock_server, "token-abc");
    let rows = client
        .fetch_page("abcd-1234", &build(&Query::new(), 10, 0))
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_fetch_page_without_token_sends_no_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    client
        .fetch_page("abcd-1234", &build(&Query::new(), 10, 0))
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("x-app-token").is_none());
}

#[test_case("" ; "empty")]
#[test_case("   " ; "whitespace")]
#[tokio::test]
async fn test_fetch_page_blank_token_sends_no_header(token: &str) {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let client = client_with_token(&mock_server, token);
    assert!(!format!("{client:?}").contains("has_app_token: true"));
    client
        .fetch_page("abcd-1234", &build(&Query::new(), 10, 0))
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("x-app-token").is_none());
}

// ============================================================================
// CSV Export Tests
// ============================================================================

#[test]
fn test_csv_url() {
    let client = HttpClient::from_config(&ClientConfig::default()).unwrap();
    assert_eq!(
        client.csv_url("ijzp-q8t2").unwrap().as_str(),
        "https://data.cityofchicago.org/resource/ijzp-q8t2.csv"
    );
    assert!(client.csv_url("").is_err());
}

#[tokio::test]
async fn test_fetch_csv_sends_params_accept_and_token() {
    let mock_server = MockServer::start().await;
    let body = "\"id\",\"primary_type\"\n\"1\",\"THEFT\"\n\"2\",\"BATTERY\"\n";

    Mock::given(method("GET"))
        .and(path("/resource/ijzp-q8t2.csv"))
        .and(query_param("$where", "year = 2024"))
        .and(query_param("$limit", "2"))
        .and(query_param("$offset", "0"))
        .and(header("Accept", "text/csv"))
        .and(header("X-App-Token", "token-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_with_token(&mock_server, "token-abc");
    let query = Query::builder().filter("year = 2024").build();
    let csv = client
        .fetch_csv("ijzp-q8t2", &build(&query, 2, 0))
        .await
        .unwrap();

    assert_eq!(csv, body);
    assert_eq!(csv.lines().count(), 3);
}

#[tokio::test]
async fn test_fetch_csv_status_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .fetch_csv("ijzp-q8t2", &build(&Query::new(), 10, 0))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(429));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_fetch_page_status_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .fetch_page("abcd-1234", &build(&Query::new(), 10, 0))
        .await
        .unwrap_err();

    match err {
        Error::Transport {
            status,
            status_text,
            body,
        } => {
            assert_eq!(status, 503);
            assert_eq!(status_text, "Service Unavailable");
            assert_eq!(body, "try later");
        }
        other => panic!("Expected Transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_page_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .fetch_page("invalid-dataset-id", &build(&Query::new(), 10, 0))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_fetch_page_decode_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .fetch_page("abcd-1234", &build(&Query::new(), 10, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn test_fetch_page_object_body_is_decode_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"error": true, "message": "nope"})),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .fetch_page("abcd-1234", &build(&Query::new(), 10, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn test_fetch_page_network_failure() {
    // Reserve a port, then free it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::builder()
        .base_url(format!("http://{addr}/resource"))
        .timeout(Duration::from_secs(2))
        .build();
    let client = HttpClient::from_config(&config).unwrap();

    let err = client
        .fetch_page("abcd-1234", &build(&Query::new(), 10, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Network(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_get_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/data"))
        .and(query_param("q", "crimes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 42})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let url = url::Url::parse(&format!("{}/api/data", mock_server.uri())).unwrap();
    let data: serde_json::Value = client
        .get_json(url, &[("q", "crimes".to_string())])
        .await
        .unwrap();

    assert_eq!(data["value"], 42);
}

#[tokio::test]
async fn test_http_client_with_rate_limiter() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = ClientConfig::builder()
        .base_url(format!("{}/resource", mock_server.uri()))
        .rate_limit(RateLimiterConfig::new(100, 10))
        .build();
    let client = HttpClient::from_config(&config).unwrap();
    assert!(client.has_rate_limiter());

    for _ in 0..3 {
        client
            .fetch_page("abcd-1234", &build(&Query::new(), 10, 0))
            .await
            .unwrap();
    }
}

// ============================================================================
// Rate Limiter Tests
// ============================================================================

#[test]
fn test_rate_limiter_anonymous_preset() {
    let limiter = RateLimiter::new(&RateLimiterConfig::anonymous());
    assert_eq!(limiter.config(), &RateLimiterConfig::new(1, 1));
    assert!(limiter.try_acquire());
    assert!(!limiter.try_acquire());
}

#[test]
fn test_rate_limiter_allows_burst_then_blocks() {
    let limiter = RateLimiter::new(&RateLimiterConfig::new(1, 3));

    for _ in 0..3 {
        assert!(limiter.try_acquire());
    }
    assert!(!limiter.try_acquire());
}

#[test]
fn test_rate_limiter_zero_config_clamped() {
    let limiter = RateLimiter::new(&RateLimiterConfig::new(0, 0));
    assert!(limiter.try_acquire());
}

#[tokio::test]
async fn test_rate_limiter_clones_share_bucket() {
    let limiter = RateLimiter::new(&RateLimiterConfig::new(1, 2));
    let other = limiter.clone();

    limiter.wait().await;
    assert!(other.try_acquire());
    assert!(!limiter.try_acquire());
}

// ============================================================================
// Retry Policy Tests
// ============================================================================

#[test]
fn test_retry_policy_default() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_retries, 3);
    assert_eq!(policy.backoff_type, BackoffType::Exponential);
    assert_eq!(RetryPolicy::none().max_retries, 0);
}

#[test]
fn test_calculate_backoff_constant() {
    let policy = RetryPolicy::default().with_backoff(
        BackoffType::Constant,
        Duration::from_millis(100),
        Duration::from_secs(10),
    );
    assert_eq!(policy.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(policy.calculate_backoff(5), Duration::from_millis(100));
}

#[test]
fn test_calculate_backoff_linear() {
    let policy = RetryPolicy::default().with_backoff(
        BackoffType::Linear,
        Duration::from_millis(100),
        Duration::from_secs(10),
    );
    assert_eq!(policy.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(policy.calculate_backoff(1), Duration::from_millis(200));
    assert_eq!(policy.calculate_backoff(2), Duration::from_millis(300));
}

#[test]
fn test_calculate_backoff_exponential() {
    let policy = RetryPolicy::default().with_backoff(
        BackoffType::Exponential,
        Duration::from_millis(100),
        Duration::from_secs(10),
    );
    assert_eq!(policy.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(policy.calculate_backoff(1), Duration::from_millis(200));
    assert_eq!(policy.calculate_backoff(3), Duration::from_millis(800));
}

#[test]
fn test_calculate_backoff_respects_max() {
    let policy = RetryPolicy::default().with_backoff(
        BackoffType::Exponential,
        Duration::from_millis(100),
        Duration::from_millis(500),
    );
    assert_eq!(policy.calculate_backoff(10), Duration::from_millis(500));
    assert_eq!(policy.calculate_backoff(40), Duration::from_millis(500));
}

fn fast_policy(retries: u32) -> RetryPolicy {
    RetryPolicy::default()
        .with_max_retries(retries)
        .with_backoff(
            BackoffType::Constant,
            Duration::from_millis(1),
            Duration::from_millis(1),
        )
}

#[tokio::test]
async fn test_retry_run_recovers() {
    let attempts = AtomicU32::new(0);
    let counter = &attempts;
    let result = fast_policy(3)
        .run(move || async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(Error::transport(503, "Service Unavailable", ""))
            } else {
                Ok("done")
            }
        })
        .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_run_gives_up() {
    let attempts = AtomicU32::new(0);
    let counter = &attempts;
    let result: crate::Result<()> = fast_policy(2)
        .run(move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(Error::transport(429, "Too Many Requests", ""))
        })
        .await;

    assert_eq!(result.unwrap_err().status(), Some(429));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_run_skips_non_retryable() {
    let attempts = AtomicU32::new(0);
    let counter = &attempts;
    let result: crate::Result<()> = fast_policy(5)
        .run(move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(Error::transport(400, "Bad Request", "bad $where"))
        })
        .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}
