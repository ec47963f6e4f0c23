// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Transport selection: which base URL and credentials a mode resolves to,
//! and the pooled HTTP client built for that resolution.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use url::Url;

use crate::config::{ConnectionConfig, DeploymentMode};
use crate::error::{HaystackError, Result};

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Authentication applied to every request of a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// No authentication.
    None,
    /// `Authorization: Bearer <token>`, used towards the relay gateway.
    Bearer(String),
    /// HTTP Basic authentication, used towards the controller.
    Basic {
        username: String,
        password: String,
    },
}

/// Whether requests go straight to the controller or through the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Direct,
    Relay,
}

/// Resolved target of a mode: base URL, auth and route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Base URL without a trailing slash.
    pub base_url: String,
    pub auth: Auth,
    pub route: Route,
}

/// Resolve the endpoint for `mode`.
///
/// Relay mode uses the relay URL with an optional bearer token. Every other
/// case, including relay mode without a relay URL, addresses the controller
/// directly with optional basic auth.
pub fn resolve_endpoint(config: &ConnectionConfig, mode: DeploymentMode) -> Endpoint {
    if let (DeploymentMode::Relay, Some(relay_url)) = (mode, config.relay_url.as_deref()) {
        let auth = match config.relay_token.as_deref() {
            Some(token) if !token.is_empty() => Auth::Bearer(token.to_owned()),
            _ => Auth::None,
        };
        return Endpoint {
            base_url: relay_url.trim_end_matches('/').to_owned(),
            auth,
            route: Route::Relay,
        };
    }

    let scheme = if config.use_tls { "https" } else { "http" };
    let path = config.api_path.trim().trim_matches('/');
    let base_url = if path.is_empty() {
        format!("{scheme}://{}:{}", config.host, config.port)
    } else {
        format!("{scheme}://{}:{}/{path}", config.host, config.port)
    };
    let auth = if config.username.is_empty() {
        Auth::None
    } else {
        Auth::Basic {
            username: config.username.clone(),
            password: config.password.clone(),
        }
    };

    Endpoint {
        base_url,
        auth,
        route: Route::Direct,
    }
}

/// Reject an endpoint whose base URL does not parse.
pub(crate) fn check_base_url(endpoint: &Endpoint) -> Result<()> {
    Url::parse(&endpoint.base_url).map_err(|e| {
        HaystackError::InvalidConfig(format!("invalid base URL `{}`: {e}", endpoint.base_url))
    })?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// An HTTP client bound to one resolved endpoint.
///
/// Built per mode and reused across calls; a mode change produces a new one.
#[derive(Debug)]
pub struct Transport {
    /// Mode this transport was resolved for.
    pub(crate) mode: DeploymentMode,
    pub(crate) endpoint: Endpoint,
    pub(crate) http: reqwest::Client,
    pub(crate) timeout: Duration,
}

impl Transport {
    /// Resolve the endpoint for `mode` and build its HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`HaystackError::InvalidConfig`] if the resolved base URL does
    /// not parse or the HTTP client cannot be built.
    pub fn connect(config: &ConnectionConfig, mode: DeploymentMode) -> Result<Self> {
        let endpoint = resolve_endpoint(config, mode);
        check_base_url(&endpoint)?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| HaystackError::InvalidConfig(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            mode,
            endpoint,
            http,
            timeout: config.timeout,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn mode(&self) -> DeploymentMode {
        self.mode
    }

    /// Attach authentication headers to an outgoing request builder.
    pub(crate) fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.endpoint.auth {
            Auth::None => builder,
            Auth::Bearer(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            Auth::Basic { username, password } => builder.basic_auth(username, Some(password)),
        }
    }
}
