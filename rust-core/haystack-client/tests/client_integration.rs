// SPDX-License-Identifier: PMPL-1.0-or-later
//! End-to-end tests of `execute_operation` against mock controllers and
//! relay gateways: request shapes, the 405 POST fallback, hybrid failover,
//! timeouts and response decoding.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use common::{dead_port, envelope, MockServer, Reply};
use haystack_client::{
    ConnectionConfig, DeploymentMode, HaystackClient, HaystackError, Params, Scalar,
};
use serde_json::json;

const HIS_GRID: &str = "ver:\"3.0\"\nts,val\nts:2024-01-01T00:00:00Z,n:72.5 °F";
const EMPTY_ZINC: &str = "ver:\"3.0\"\nempty";

fn local_client(server: &MockServer) -> HaystackClient {
    HaystackClient::new(ConnectionConfig::local("127.0.0.1", server.port)).unwrap()
}

fn hybrid_config(relay: &MockServer) -> ConnectionConfig {
    ConnectionConfig::local("127.0.0.1", dead_port())
        .with_mode(DeploymentMode::Hybrid)
        .with_relay(relay.base_url.clone(), Some("secret".to_string()))
}

fn relay_grid() -> Reply {
    envelope(json!({
        "cols": [{"name": "id"}, {"name": "dis"}],
        "rows": [{"id": "r:p1", "dis": "Zone Temp"}]
    }))
}

// ---------------------------------------------------------------------------
// Direct dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_his_read_sends_exactly_id_and_range() {
    let server = MockServer::start(Reply::zinc(HIS_GRID)).await;
    let client = local_client(&server);

    let params = Params::new()
        .with("id", "@p1")
        .with("range", "today")
        .with("limit", 10);
    let grid = client.execute_operation("hisRead", Some(&params)).await.unwrap();

    assert_eq!(grid.columns(), ["ts", "val"]);
    assert_eq!(grid.rows()[0]["ts"], Scalar::DateTimeText("2024-01-01T00:00:00Z".into()));
    assert_eq!(
        grid.rows()[0]["val"],
        Scalar::Number { value: 72.5, unit: Some("°F".into()) }
    );

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[0].path, "/haystack/hisRead");
    assert_eq!(
        requests[0].query,
        vec![("id".to_string(), "@p1".to_string()), ("range".to_string(), "today".to_string())]
    );
}

#[tokio::test]
async fn test_missing_parameter_sends_nothing() {
    let server = MockServer::start(Reply::zinc(HIS_GRID)).await;
    let client = local_client(&server);

    let params = Params::new().with("id", "@p1");
    let err = client.execute_operation("hisRead", Some(&params)).await.unwrap_err();

    assert!(matches!(
        err,
        HaystackError::MissingParameter { ref parameter, .. } if parameter == "range"
    ));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_about_carries_no_parameters() {
    let server = MockServer::start(Reply::zinc("ver:\"3.0\"\nserverName\n\"Station\"")).await;
    let client = local_client(&server);

    let params = Params::new().with("filter", "ignored");
    client.execute_operation("about", Some(&params)).await.unwrap();

    let requests = server.requests();
    assert_eq!(requests[0].path, "/haystack/about");
    assert!(requests[0].query.is_empty());
}

#[tokio::test]
async fn test_basic_auth_on_direct_requests() {
    let server = MockServer::start(Reply::zinc(EMPTY_ZINC)).await;
    let client = HaystackClient::new(
        ConnectionConfig::local("127.0.0.1", server.port).with_credentials("admin", "pw"),
    )
    .unwrap();

    client.execute_operation("about", None).await.unwrap();

    assert_eq!(
        server.requests()[0].authorization.as_deref(),
        Some("Basic YWRtaW46cHc=")
    );
}

// ---------------------------------------------------------------------------
// 405 fallback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_405_retries_once_as_form_post() {
    let server = MockServer::start(Reply::zinc(EMPTY_ZINC).status(405, 200)).await;
    let client = local_client(&server);

    let params = Params::new().with("id", "@p1").with("level", 8).with("val", 72.5);
    let grid = client.execute_operation("pointWrite", Some(&params)).await.unwrap();
    assert!(grid.is_empty());

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[1].method, Method::POST);
    assert_eq!(requests[1].path, "/haystack/pointWrite");
    assert!(requests[1].query.is_empty());
    assert!(requests[1]
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded")));
    assert_eq!(
        requests[1].form(),
        vec![
            ("id".to_string(), "@p1".to_string()),
            ("level".to_string(), "8".to_string()),
            ("val".to_string(), "72.5".to_string())
        ]
    );
}

#[tokio::test]
async fn test_second_405_surfaces_as_http_status() {
    let server = MockServer::start(Reply::zinc(EMPTY_ZINC).status(405, 405)).await;
    let client = local_client(&server);

    let params = Params::new().with("watchId", "w-1");
    let err = client.execute_operation("watchPoll", Some(&params)).await.unwrap_err();

    assert_eq!(err.status(), Some(405));
    assert_eq!(server.requests().len(), 2);
}

#[tokio::test]
async fn test_405_on_read_is_not_retried() {
    let server = MockServer::start(Reply::zinc(EMPTY_ZINC).status(405, 200)).await;
    let client = local_client(&server);

    let params = Params::new().with("filter", "point");
    let err = client.execute_operation("read", Some(&params)).await.unwrap_err();

    assert_eq!(err.status(), Some(405));
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_server_error_keeps_body() {
    let server = MockServer::start(Reply::ok("text/plain", "boom").status(500, 500)).await;
    let client = local_client(&server);

    let err = client.execute_operation("about", None).await.unwrap_err();
    assert!(matches!(err, HaystackError::HttpStatus { status: 500, ref body } if body == "boom"));
}

// ---------------------------------------------------------------------------
// Response decoding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_json_response_is_decoded() {
    let server = MockServer::start(Reply::json(json!({
        "meta": {"ver": "3.0"},
        "cols": [{"name": "id"}, {"name": "curVal"}],
        "rows": [{"id": "r:p1", "curVal": "n:21 °C"}, {"id": "r:p2"}]
    })))
    .await;
    let client = local_client(&server);

    let grid = client.execute_operation("read", None).await.unwrap();
    assert_eq!(grid.len(), 2);
    assert_eq!(grid.rows()[1]["curVal"], Scalar::Null);
    assert_eq!(grid.meta_value("ver"), Some("3.0"));
}

#[tokio::test]
async fn test_zinc_body_under_plain_text_is_sniffed() {
    let body = "ver:\"3.0\"\nid,dis\n@p1,\"A, B\"";
    let server = MockServer::start(Reply::ok("text/plain", body)).await;
    let client = local_client(&server);

    let grid = client.execute_operation("read", None).await.unwrap();
    assert_eq!(grid.rows()[0]["dis"], Scalar::Str("A, B".into()));
}

#[tokio::test]
async fn test_unknown_media_type_is_reported() {
    let server = MockServer::start(Reply::ok("text/html", "<html>login</html>")).await;
    let client = local_client(&server);

    let err = client.execute_operation("about", None).await.unwrap_err();
    match err {
        HaystackError::UnsupportedMediaType { content_type, body } => {
            assert!(content_type.starts_with("text/html"));
            assert_eq!(body, "<html>login</html>");
        }
        other => panic!("expected UnsupportedMediaType, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_zinc_is_invalid_grid() {
    let server = MockServer::start(Reply::zinc("ver:\"3.0\"")).await;
    let client = local_client(&server);

    let err = client.execute_operation("about", None).await.unwrap_err();
    assert!(matches!(err, HaystackError::InvalidGrid(_)));
}

// ---------------------------------------------------------------------------
// Relay and failover
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_relay_mode_posts_envelope_with_bearer() {
    let relay = MockServer::start(relay_grid()).await;
    let client = HaystackClient::new(
        ConnectionConfig::relay(relay.base_url.clone())
            .with_relay(relay.base_url.clone(), Some("secret".into())),
    )
    .unwrap();

    let params = Params::new().with("filter", "point").with("limit", 5);
    let grid = client.execute_operation("read", Some(&params)).await.unwrap();
    assert_eq!(grid.rows()[0]["id"], Scalar::Ref("r:p1".into()));

    let requests = relay.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].path, "/haystack");
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer secret"));
    assert_eq!(
        requests[0].json(),
        json!({"operation": "read", "params": {"filter": "point", "limit": 5}})
    );
}

#[tokio::test]
async fn test_relay_rejection() {
    let relay = MockServer::start(Reply::json(
        json!({"success": false, "error": "Niagara returned error: 500"}),
    ))
    .await;
    let client = HaystackClient::new(ConnectionConfig::relay(relay.base_url.clone())).unwrap();

    let err = client.execute_operation("about", None).await.unwrap_err();
    assert!(matches!(err, HaystackError::RelayRejected(ref m) if m.contains("500")));
}

#[tokio::test]
async fn test_hybrid_fails_over_to_relay_once() {
    let relay = MockServer::start(relay_grid()).await;
    let client = HaystackClient::new(hybrid_config(&relay)).unwrap();
    assert_eq!(client.mode(), DeploymentMode::Hybrid);

    let params = Params::new().with("filter", "point");
    let grid = client.execute_operation("read", Some(&params)).await.unwrap();

    assert_eq!(grid.len(), 1);
    assert_eq!(client.mode(), DeploymentMode::Relay);
    let requests = relay.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer secret"));
    assert_eq!(
        requests[0].json(),
        json!({"operation": "read", "params": {"filter": "point"}})
    );

    // Later calls go straight to the relay.
    client.execute_operation("about", None).await.unwrap();
    assert_eq!(relay.requests().len(), 2);
    assert_eq!(client.mode(), DeploymentMode::Relay);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_hybrid_failures_switch_once() {
    let relay = MockServer::start(relay_grid()).await;
    let client = Arc::new(HaystackClient::new(hybrid_config(&relay)).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.execute_operation("about", None).await })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    assert_eq!(client.mode(), DeploymentMode::Relay);
    assert_eq!(relay.requests().len(), 8);
}

#[tokio::test]
async fn test_hybrid_without_relay_reports_connect_failure() {
    let client = HaystackClient::new(
        ConnectionConfig::local("127.0.0.1", dead_port()).with_mode(DeploymentMode::Hybrid),
    )
    .unwrap();

    let err = client.execute_operation("about", None).await.unwrap_err();
    assert!(err.is_connect_failure());
    assert_eq!(client.mode(), DeploymentMode::Hybrid);
}

#[tokio::test]
async fn test_local_connect_failure_does_not_change_mode() {
    let client = HaystackClient::new(ConnectionConfig::local("127.0.0.1", dead_port())).unwrap();

    let err = client.execute_operation("about", None).await.unwrap_err();
    assert!(err.is_connect_failure());
    assert_eq!(client.mode(), DeploymentMode::Local);
}

#[tokio::test]
async fn test_unreachable_relay_is_not_retried() {
    let client = HaystackClient::new(ConnectionConfig::relay(format!(
        "http://127.0.0.1:{}",
        dead_port()
    )))
    .unwrap();

    let err = client.execute_operation("about", None).await.unwrap_err();
    assert!(err.is_connect_failure());
    assert_eq!(client.mode(), DeploymentMode::Relay);
}

#[tokio::test]
async fn test_timeout_does_not_fail_over() {
    let slow = Reply::zinc(EMPTY_ZINC).delayed(Duration::from_secs(2));
    let controller = MockServer::start(slow).await;
    let relay = MockServer::start(relay_grid()).await;
    let client = HaystackClient::new(
        ConnectionConfig::local("127.0.0.1", controller.port)
            .with_mode(DeploymentMode::Hybrid)
            .with_relay(relay.base_url.clone(), None)
            .with_timeout(Duration::from_millis(200)),
    )
    .unwrap();

    let err = client.execute_operation("about", None).await.unwrap_err();
    assert!(matches!(err, HaystackError::Timeout(200)));
    assert_eq!(client.mode(), DeploymentMode::Hybrid);
    assert!(relay.requests().is_empty());
}
