// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Haystack client: configuration, transport and response decoding.
//!
//! [`HaystackClient`] is the entry point for all operations. It owns the
//! configuration, the live deployment mode, the failover controller and the
//! pooled transport for the current mode. Typed tool methods (points,
//! history, watches, alarms, ...) are defined as `impl HaystackClient` blocks
//! in their own modules and all go through [`HaystackClient::execute_operation`].

use std::sync::{Arc, RwLock};

use haystack_grid::{Grid, WireFormat};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use tracing::{debug, instrument, warn};

use crate::config::{ConnectionConfig, DeploymentMode};
use crate::dispatch::{self, Encoding, Params, RequestPlan};
use crate::error::{HaystackError, Result};
use crate::failover::FailoverController;
use crate::mode::ModeState;
use crate::relay;
use crate::transport::{check_base_url, resolve_endpoint, Endpoint, Route, Transport};

/// The Haystack client.
///
/// Cheap to share behind an `Arc`; concurrent calls are independent apart
/// from the deployment mode, which may switch once from hybrid to relay.
///
/// # Examples
///
/// ```rust,no_run
/// use haystack_client::{ConnectionConfig, HaystackClient, Params};
///
/// # #[tokio::main]
/// # async fn main() -> haystack_client::Result<()> {
/// let client = HaystackClient::new(ConnectionConfig::local("station.local", 80))?;
/// let params = Params::new().with("filter", "point and temp");
/// let grid = client.execute_operation("read", Some(&params)).await?;
/// println!("{} points", grid.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HaystackClient {
    config: ConnectionConfig,
    mode: Arc<ModeState>,
    failover: FailoverController,
    /// Transport for the mode it was built under; rebuilt when the mode moves.
    transport: RwLock<Option<Arc<Transport>>>,
}

impl HaystackClient {
    // -- Constructors -------------------------------------------------------

    /// Create a client. The endpoint for the initial mode is resolved eagerly
    /// so configuration mistakes surface here rather than on the first call.
    /// A hybrid client also checks the relay it may fail over to.
    ///
    /// # Errors
    ///
    /// Returns [`HaystackError::InvalidConfig`] if an endpoint URL is invalid.
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        if config.mode == DeploymentMode::Hybrid && config.relay_url.is_some() {
            check_base_url(&resolve_endpoint(&config, DeploymentMode::Relay))?;
        }
        let mode = Arc::new(ModeState::new(config.mode));
        let failover = FailoverController::new(Arc::clone(&mode), config.relay_url.is_some());
        let client = Self {
            config,
            mode,
            failover,
            transport: RwLock::new(None),
        };
        client.transport()?;
        Ok(client)
    }

    /// Create a client from `ConnectionConfig::from_env()`.
    pub fn from_env() -> Result<Self> {
        Self::new(ConnectionConfig::from_env())
    }

    // -- Accessors ----------------------------------------------------------

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// The deployment mode currently in effect.
    pub fn mode(&self) -> DeploymentMode {
        self.mode.current()
    }

    /// The endpoint the next call will use.
    pub fn endpoint(&self) -> Endpoint {
        resolve_endpoint(&self.config, self.mode())
    }

    // -- Operations ---------------------------------------------------------

    /// Execute a Haystack operation and decode the response into a [`Grid`].
    ///
    /// In hybrid mode a connection failure switches the client to relay mode
    /// for good and the call is issued once more through the relay; the caller
    /// only sees the second outcome.
    ///
    /// # Errors
    ///
    /// Any [`HaystackError`]; see the variants for when each applies.
    #[instrument(skip(self, params))]
    pub async fn execute_operation(&self, op: &str, params: Option<&Params>) -> Result<Grid> {
        let transport = self.transport()?;
        let result = match self.send(&transport, op, params).await {
            Err(err) if self.failover.should_retry(transport.mode(), &err) => {
                let relay = self.transport()?;
                self.send(&relay, op, params).await
            }
            other => other,
        };

        if let Err(err) = &result {
            warn!(op, error = %err, "Haystack operation failed");
        }
        result
    }

    // -- Internal helpers ---------------------------------------------------

    /// Transport for the current mode, building a new one after a mode change.
    fn transport(&self) -> Result<Arc<Transport>> {
        let mode = self.mode.current();
        if let Ok(slot) = self.transport.read() {
            if let Some(existing) = slot.as_ref().filter(|t| t.mode() == mode) {
                return Ok(Arc::clone(existing));
            }
        }

        let fresh = Arc::new(Transport::connect(&self.config, mode)?);
        debug!(
            mode = %mode,
            base_url = %fresh.endpoint().base_url,
            "Resolved transport"
        );
        if let Ok(mut slot) = self.transport.write() {
            *slot = Some(Arc::clone(&fresh));
        }
        Ok(fresh)
    }

    /// One logical call over one transport, including the single 405 retry.
    async fn send(&self, transport: &Transport, op: &str, params: Option<&Params>) -> Result<Grid> {
        let plan = dispatch::build_request(transport.endpoint(), op, params)?;
        debug!(op, method = %plan.method, url = %plan.url, "Sending Haystack request");

        let mut response = issue(transport, &plan).await?;
        if response.status() == StatusCode::METHOD_NOT_ALLOWED && plan.post_on_405 {
            warn!(op, url = %plan.url, "GET refused with 405, retrying as form POST");
            response = issue(transport, &plan.as_form_post()).await?;
        }

        decode_response(transport, response).await
    }
}

/// Put a request plan on the wire.
async fn issue(transport: &Transport, plan: &RequestPlan) -> Result<reqwest::Response> {
    let builder = transport.http.request(plan.method.clone(), &plan.url);
    let builder = match &plan.encoding {
        Encoding::None => builder,
        Encoding::Query(pairs) => builder.query(pairs),
        Encoding::Form(pairs) => builder.form(pairs),
        Encoding::Json(body) => builder.json(body),
    };

    transport
        .apply_auth(builder)
        .send()
        .await
        .map_err(|e| HaystackError::from_reqwest(e, transport.timeout))
}

/// Turn a response into a grid: non-2xx becomes [`HaystackError::HttpStatus`],
/// relay bodies are unwrapped from their envelope, direct bodies are decoded
/// by content type.
async fn decode_response(transport: &Transport, response: reqwest::Response) -> Result<Grid> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = response
        .text()
        .await
        .map_err(|e| HaystackError::from_reqwest(e, transport.timeout))?;

    if !status.is_success() {
        return Err(HaystackError::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }

    match transport.endpoint().route {
        Route::Relay => relay::decode_envelope(&body),
        Route::Direct => match WireFormat::detect(content_type.as_deref(), &body) {
            Some(format) => Ok(format.decode(&body)?),
            None => Err(HaystackError::UnsupportedMediaType {
                content_type: content_type.unwrap_or_default(),
                body,
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_resolves_initial_endpoint() {
        let client = HaystackClient::new(
            ConnectionConfig::local("station", 8080).with_credentials("admin", "pw"),
        )
        .unwrap();
        assert_eq!(client.mode(), DeploymentMode::Local);
        assert_eq!(client.endpoint().base_url, "http://station:8080/haystack");
        assert_eq!(client.endpoint().route, Route::Direct);
    }

    #[test]
    fn test_new_rejects_invalid_relay_url() {
        let config = ConnectionConfig::relay("not a url");
        assert!(matches!(
            HaystackClient::new(config),
            Err(HaystackError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_new_rejects_invalid_failover_relay_url() {
        let config = ConnectionConfig::local("station", 8080)
            .with_mode(DeploymentMode::Hybrid)
            .with_relay("not a url", None);
        assert!(matches!(
            HaystackClient::new(config),
            Err(HaystackError::InvalidConfig(msg)) if msg.contains("not a url")
        ));

        let config = ConnectionConfig::local("station", 8080)
            .with_mode(DeploymentMode::Hybrid)
            .with_relay("http://relay:9000", None);
        assert_eq!(HaystackClient::new(config).unwrap().mode(), DeploymentMode::Hybrid);
    }

    #[test]
    fn test_transport_is_reused_until_mode_changes() {
        let config = ConnectionConfig::local("station", 8080)
            .with_mode(DeploymentMode::Hybrid)
            .with_relay("http://relay:9000", Some("tok".into()));
        let client = HaystackClient::new(config).unwrap();

        let first = client.transport().unwrap();
        let second = client.transport().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.endpoint().route, Route::Direct);

        assert!(client.mode.promote_hybrid_to_relay());
        let third = client.transport().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.endpoint().route, Route::Relay);
        assert_eq!(third.endpoint().base_url, "http://relay:9000");
    }
}
