// SPDX-License-Identifier: PMPL-1.0-or-later
//! In-process mock controller and relay gateway for integration tests.
//!
//! The server answers every path from a list of canned replies. A reply is
//! chosen by the first key contained in `"{path}?{decoded query}"`, so tests
//! can route on the operation name or on a filter fragment.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use url::form_urlencoded;

/// One request as the mock saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub content_type: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

impl Recorded {
    pub fn query_value(&self, name: &str) -> Option<&str> {
        lookup(&self.query, name)
    }

    /// Body decoded as `application/x-www-form-urlencoded`.
    pub fn form(&self) -> Vec<(String, String)> {
        decode_pairs(&self.body)
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

/// Canned answer.
#[derive(Debug, Clone)]
pub struct Reply {
    pub get_status: u16,
    pub post_status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub delay: Option<Duration>,
}

impl Reply {
    pub fn zinc(body: &str) -> Self {
        Self::ok("text/zinc; charset=utf-8", body)
    }

    pub fn json(body: serde_json::Value) -> Self {
        Self::ok("application/json", &body.to_string())
    }

    pub fn ok(content_type: &'static str, body: &str) -> Self {
        Self {
            get_status: 200,
            post_status: 200,
            content_type,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn status(mut self, get_status: u16, post_status: u16) -> Self {
        self.get_status = get_status;
        self.post_status = post_status;
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Clone)]
struct MockState {
    routes: Arc<Vec<(String, Reply)>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

pub struct MockServer {
    pub base_url: String,
    pub port: u16,
    requests: Arc<Mutex<Vec<Recorded>>>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockServer {
    /// Answer every request with `reply`.
    pub async fn start(reply: Reply) -> Self {
        Self::routed(vec![("", reply)]).await
    }

    /// Answer with the first route whose key matches; 404 otherwise.
    pub async fn routed(routes: Vec<(&str, Reply)>) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let max_in_flight = Arc::new(AtomicUsize::new(0));
        let state = MockState {
            routes: Arc::new(routes.into_iter().map(|(k, r)| (k.to_string(), r)).collect()),
            requests: Arc::clone(&requests),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::clone(&max_in_flight),
        };
        let app = Router::new().fallback(handle).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });

        Self {
            base_url: format!("http://{addr}"),
            port: addr.port(),
            requests,
            max_in_flight,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("request log").clone()
    }

    /// Highest number of requests the server was answering at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    let recorded = Recorded {
        method: method.clone(),
        path: uri.path().to_string(),
        query: decode_pairs(uri.query().unwrap_or_default()),
        content_type: header_text(header::CONTENT_TYPE),
        authorization: header_text(header::AUTHORIZATION),
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    let mut fields = recorded.query.clone();
    fields.extend(recorded.form());
    let route_key = format!(
        "{}?{}",
        recorded.path,
        fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    );
    state.requests.lock().expect("request log").push(recorded);

    let matched = state
        .routes
        .iter()
        .find(|(key, _)| route_key.contains(key.as_str()));
    let Some((_, reply)) = matched else {
        return (StatusCode::NOT_FOUND, "no route").into_response();
    };

    let current = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.max_in_flight.fetch_max(current, Ordering::SeqCst);
    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }
    state.in_flight.fetch_sub(1, Ordering::SeqCst);
    let status = if method == Method::POST {
        reply.post_status
    } else {
        reply.get_status
    };
    (
        StatusCode::from_u16(status).expect("valid status"),
        [(header::CONTENT_TYPE, reply.content_type)],
        reply.body.clone(),
    )
        .into_response()
}

fn decode_pairs(text: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(text.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn lookup<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
}

/// A local port with nothing listening on it.
pub fn dead_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe");
    listener.local_addr().expect("probe address").port()
}

/// Relay envelope around a JSON grid.
pub fn envelope(data: serde_json::Value) -> Reply {
    Reply::json(serde_json::json!({"success": true, "data": data}))
}
