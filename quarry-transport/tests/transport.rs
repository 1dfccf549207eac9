//! Integration tests for the HTTP transport against a mock cluster node.

use quarry_transport::*;
use std::time::Duration;
use wiremock::matchers::{body_string, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(urls: Vec<Url>) -> TransportConfigBuilder {
    TransportConfig::builder()
        .nodes(urls)
        .timeout(Duration::from_secs(5))
}

fn closed_port_url() -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    Url::parse(&format!("http://127.0.0.1:{port}")).unwrap()
}

#[tokio::test]
async fn test_perform_returns_unread_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_cat/indices"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"index":"logs"}]"#))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(config_for(vec![Url::parse(&server.uri()).unwrap()]).build()).unwrap();
    let request = WireRequest::new(Method::GET, "/_cat/indices").with_param("format", "json");

    let response = transport.perform(request).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);
    assert!(!response.is_error());

    let body = response.body.unwrap().read_all().await.unwrap();
    assert_eq!(&body[..], br#"[{"index":"logs"}]"#);
}

#[tokio::test]
async fn test_error_status_is_a_response_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(config_for(vec![Url::parse(&server.uri()).unwrap()]).build()).unwrap();
    let response = transport
        .perform(WireRequest::new(Method::HEAD, "/missing"))
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.is_error());
}

#[tokio::test]
async fn test_retries_on_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(config_for(vec![Url::parse(&server.uri()).unwrap()]).build()).unwrap();
    let response = transport.perform(WireRequest::new(Method::GET, "/")).await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    let metrics = transport.metrics();
    assert_eq!(metrics.requests, 2);
    assert_eq!(metrics.responses.get(&503), Some(&1));
    assert_eq!(metrics.responses.get(&200), Some(&1));
}

#[tokio::test]
async fn test_last_retryable_response_is_returned() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&server)
        .await;

    let config = config_for(vec![Url::parse(&server.uri()).unwrap()])
        .retry(RetryConfig::constant(1, Duration::from_millis(1)))
        .build();
    let transport = HttpTransport::new(config).unwrap();
    let response = transport.perform(WireRequest::new(Method::GET, "/")).await.unwrap();

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_retry_disabled_sends_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(vec![Url::parse(&server.uri()).unwrap()])
        .retry(RetryConfig::disabled())
        .build();
    let transport = HttpTransport::new(config).unwrap();
    let response = transport.perform(WireRequest::new(Method::GET, "/")).await.unwrap();

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_failover_to_live_node() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let dead = closed_port_url();
    let live = Url::parse(&server.uri()).unwrap();
    let transport = HttpTransport::new(config_for(vec![dead, live]).build()).unwrap();

    let response = transport.perform(WireRequest::new(Method::GET, "/")).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);

    let metrics = transport.metrics();
    assert_eq!(metrics.failures, 1);
    assert_eq!(metrics.requests, 2);
}

#[tokio::test]
async fn test_connection_refused_is_a_transport_error() {
    let config = config_for(vec![closed_port_url()])
        .retry(RetryConfig::disabled())
        .build();
    let transport = HttpTransport::new(config).unwrap();

    let err = transport
        .perform(WireRequest::new(Method::GET, "/"))
        .await
        .unwrap_err();
    assert!(err.is_connection());
}

#[tokio::test]
async fn test_basic_auth_and_default_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/logs/_doc"))
        .and(header("authorization", "Basic YWRtaW46YWRtaW4="))
        .and(header("x-team", "search"))
        .and(header("content-type", "application/json"))
        .and(header_exists("user-agent"))
        .and(body_string(r#"{"msg":"hi"}"#))
        .respond_with(ResponseTemplate::new(201).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(vec![Url::parse(&server.uri()).unwrap()])
        .basic_auth("admin", "admin")
        .default_header("x-team", "search")
        .build();
    let transport = HttpTransport::new(config).unwrap();

    let request = WireRequest::new(Method::POST, "/logs/_doc").with_body(r#"{"msg":"hi"}"#);
    let response = transport.perform(request).await.unwrap();
    assert_eq!(response.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_compressed_request_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_search"))
        .and(header("content-encoding", "gzip"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(vec![Url::parse(&server.uri()).unwrap()])
        .compress_request_body(true)
        .build();
    let transport = HttpTransport::new(config).unwrap();

    let request = WireRequest::new(Method::POST, "/_search").with_body(r#"{"size":0}"#);
    let response = transport.perform(request).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);
}
