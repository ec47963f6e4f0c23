// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Error types for the Haystack client.
//!
//! All fallible operations in this crate return [`Result<T>`], an alias for
//! `std::result::Result<T, HaystackError>`. Only
//! [`HaystackError::TransportFailure`] with `connect == true` is eligible for
//! the hybrid-mode relay fallback; everything else reaches the caller as is.

use std::time::Duration;

use haystack_grid::GridError;
use thiserror::Error;

/// Error type for Haystack client operations.
#[derive(Error, Debug)]
pub enum HaystackError {
    /// The peer could not be reached or the exchange broke off (refused
    /// connection, DNS failure, TLS handshake, reset).
    #[error("Transport failure: {message}")]
    TransportFailure {
        /// Transport error text.
        message: String,
        /// `true` when no connection was ever established.
        connect: bool,
    },

    /// The peer answered with a non-2xx status.
    #[error("HTTP error ({status}): {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// The response body was not a decodable grid.
    #[error(transparent)]
    InvalidGrid(#[from] GridError),

    /// An operation that mandates a parameter was called without it.
    #[error("Operation `{operation}` requires parameter `{parameter}`")]
    MissingParameter {
        operation: String,
        parameter: String,
    },

    /// A tool-level argument is out of range or empty.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The request exceeded the configured timeout.
    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// The response content type is neither JSON nor Zinc.
    #[error("Unsupported media type `{content_type}`")]
    UnsupportedMediaType {
        /// Content type the peer declared (empty when absent).
        content_type: String,
        /// The raw body, for callers that want to inspect it.
        body: String,
    },

    /// The relay gateway answered `success: false`.
    #[error("Relay rejected operation: {0}")]
    RelayRejected(String),

    /// A JSON envelope did not parse.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The configuration produced an unusable endpoint or HTTP client.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl HaystackError {
    /// Classify a `reqwest` error, mapping timeouts to [`HaystackError::Timeout`].
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            HaystackError::Timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
        } else {
            HaystackError::TransportFailure {
                message: err.to_string(),
                connect: err.is_connect(),
            }
        }
    }

    /// Whether this is a connection-level failure (peer unreachable).
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, HaystackError::TransportFailure { connect: true, .. })
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            HaystackError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Crate-level result alias using [`HaystackError`].
pub type Result<T> = std::result::Result<T, HaystackError>;
