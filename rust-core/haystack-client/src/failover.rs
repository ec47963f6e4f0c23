// SPDX-License-Identifier: PMPL-1.0-or-later
//! Hybrid-mode failover.
//!
//! States: `Local`, `Relay`, and `Hybrid`, which behaves as `Local` until the
//! single transition `Hybrid -> Relay` fires on a connection-level failure
//! with a relay configured. The failed call is then issued once more over the
//! relay. A second attempt can never trigger another transition because the
//! mode is no longer `Hybrid`, so there is no retry loop to bound.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::DeploymentMode;
use crate::error::HaystackError;
use crate::mode::ModeState;

/// Decides whether a failed call is retried over the relay.
#[derive(Debug, Clone)]
pub struct FailoverController {
    mode: Arc<ModeState>,
    relay_configured: bool,
}

impl FailoverController {
    pub fn new(mode: Arc<ModeState>, relay_configured: bool) -> Self {
        Self {
            mode,
            relay_configured,
        }
    }

    /// React to `err` from a call that was issued under `attempted`.
    ///
    /// Returns `true` when the call should be re-issued once. That is the case
    /// when the call ran in hybrid mode, failed to connect, a relay is
    /// configured, and the mode is now `Relay`, whether this caller or a
    /// concurrent one performed the switch.
    pub fn should_retry(&self, attempted: DeploymentMode, err: &HaystackError) -> bool {
        if attempted != DeploymentMode::Hybrid || !err.is_connect_failure() {
            return false;
        }
        if !self.relay_configured {
            warn!(
                error = %err,
                "Direct connection failed in hybrid mode but no relay is configured"
            );
            return false;
        }

        if self.mode.promote_hybrid_to_relay() {
            info!(error = %err, "Direct connection failed, switching to relay mode");
        }
        self.mode.current() == DeploymentMode::Relay
    }
}
