// SPDX-License-Identifier: PMPL-1.0-or-later
//! Relay gateway wire format.
//!
//! The gateway accepts `POST {relay}/haystack` with `{operation, params}` and
//! answers `{success, data}` or `{success: false, error}`. `data` is the
//! controller's JSON grid; a gateway that forwards Zinc verbatim sends it as a
//! JSON string, which is decoded as Zinc.

use haystack_grid::{decode_json_grid, decode_zinc, Grid};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dispatch::Params;
use crate::error::{HaystackError, Result};

/// Path of the relay's operation endpoint, appended to the relay URL.
pub const RELAY_PATH: &str = "/haystack";

/// Request body sent to the relay.
#[derive(Debug, Serialize)]
pub struct RelayRequest<'a> {
    pub operation: &'a str,
    pub params: Params,
}

/// Response envelope returned by the relay.
#[derive(Debug, Deserialize)]
pub struct RelayEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Unwrap a relay response body into a grid.
///
/// # Errors
///
/// [`HaystackError::Serialization`] if the body is not an envelope,
/// [`HaystackError::RelayRejected`] for `success: false`, and
/// [`HaystackError::InvalidGrid`] if `data` is not a grid.
pub fn decode_envelope(body: &str) -> Result<Grid> {
    let envelope: RelayEnvelope = serde_json::from_str(body)?;

    if !envelope.success {
        return Err(HaystackError::RelayRejected(
            envelope
                .error
                .unwrap_or_else(|| "relay reported failure without detail".to_string()),
        ));
    }

    match envelope.data {
        None | Some(Value::Null) => Ok(Grid::default()),
        Some(Value::String(zinc)) => Ok(decode_zinc(&zinc)?),
        Some(data) => Ok(decode_json_grid(&data)?),
    }
}
