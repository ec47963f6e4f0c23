// SPDX-License-Identifier: PMPL-1.0-or-later
//! Live deployment mode.
//!
//! The mode is the only mutable connection state. It starts at the configured
//! value and can change exactly once, from `Hybrid` to `Relay`. A
//! compare-and-swap makes that transition race-free: when several calls fail
//! at the same time only one of them performs it, and all of them see `Relay`
//! afterwards.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::config::DeploymentMode;

/// Shared holder of the current [`DeploymentMode`].
#[derive(Debug)]
pub struct ModeState {
    mode: AtomicU8,
}

impl ModeState {
    pub fn new(initial: DeploymentMode) -> Self {
        Self {
            mode: AtomicU8::new(initial as u8),
        }
    }

    /// The mode currently in effect.
    pub fn current(&self) -> DeploymentMode {
        match self.mode.load(Ordering::Acquire) {
            x if x == DeploymentMode::Relay as u8 => DeploymentMode::Relay,
            x if x == DeploymentMode::Hybrid as u8 => DeploymentMode::Hybrid,
            _ => DeploymentMode::Local,
        }
    }

    /// Switch `Hybrid` to `Relay`. Returns `true` only for the caller that
    /// performed the switch; any other starting mode is left untouched.
    pub(crate) fn promote_hybrid_to_relay(&self) -> bool {
        self.mode
            .compare_exchange(
                DeploymentMode::Hybrid as u8,
                DeploymentMode::Relay as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}
