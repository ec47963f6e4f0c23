// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! # Haystack Client
//!
//! A Rust client for building-automation controllers that speak the Project
//! Haystack HTTP API, either directly or through a relay gateway.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use haystack_client::{ConnectionConfig, HaystackClient};
//!
//! #[tokio::main]
//! async fn main() -> haystack_client::Result<()> {
//!     let client = HaystackClient::new(ConnectionConfig::from_env())?;
//!     let points = client.read_points("point and temp and sensor", Some(50)).await?;
//!     println!("{} temperature sensors", points.count);
//!     Ok(())
//! }
//! ```
//!
//! ## Deployment modes
//!
//! - **local**: requests go straight to the controller with basic auth.
//! - **relay**: every request is wrapped as `{operation, params}` and posted
//!   to a gateway with a bearer token.
//! - **hybrid**: local until the first connection failure, then relay for
//!   the rest of the process.
//!
//! ## Modules
//!
//! - [`client`] - The client, transport caching and response decoding.
//! - [`config`] - Connection configuration and environment loading.
//! - [`dispatch`] - Per-operation request shapes and the 405 POST fallback.
//! - [`transport`] - Endpoint resolution and authentication per mode.
//! - [`failover`] - The hybrid-to-relay transition.
//! - [`relay`] - Relay gateway envelopes.
//! - [`types`] - Summaries returned by the typed tool methods.
//! - [`error`] - Error types and the crate-level `Result` alias.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod failover;
pub mod mode;
pub mod relay;
pub mod transport;
pub mod types;

mod alarms;
mod equipment;
mod history;
mod nav;
mod points;
mod presets;
mod project;
mod system;
mod watch;

pub use client::HaystackClient;
pub use config::{ConnectionConfig, DeploymentMode};
pub use dispatch::Params;
pub use error::{HaystackError, Result};
pub use points::{DEFAULT_WRITE_LEVEL, WRITE_LEVELS};
pub use presets::FilterPresets;

pub use haystack_grid::{Grid, Row, Scalar};
