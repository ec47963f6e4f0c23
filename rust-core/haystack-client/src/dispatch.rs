// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Operation dispatch: how each Haystack operation is put on the wire.
//!
//! Direct requests are driven by a lookup table of [`OpDescriptor`]s keyed by
//! operation name. The Haystack HTTP API prefers GET with query parameters;
//! the watch and write operations may be refused with 405 by controllers that
//! only accept them as POST, so their descriptors allow one form-encoded POST
//! retry. Relay requests bypass the table entirely: every operation becomes a
//! JSON `{operation, params}` POST and the gateway re-derives the shape.

use std::collections::BTreeMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{HaystackError, Result};
use crate::relay::{RelayRequest, RELAY_PATH};
use crate::transport::{Endpoint, Route};

// ---------------------------------------------------------------------------
// Params
// ---------------------------------------------------------------------------

/// Operation parameters, name to JSON value.
///
/// Values are sent as JSON to the relay and as text on direct query strings
/// and form bodies (strings verbatim, everything else in its JSON rendering).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Whether `name` holds a usable value (present, not null, not blank).
    pub fn has(&self, name: &str) -> bool {
        match self.0.get(name) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// All parameters as text pairs, in name order. Nulls are skipped.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), value_text(v)))
            .collect()
    }

    /// The named parameters as text pairs, in the order of `names`.
    pub fn select(&self, names: &[&str]) -> Vec<(String, String)> {
        names
            .iter()
            .filter_map(|name| {
                self.0
                    .get(*name)
                    .filter(|v| !v.is_null())
                    .map(|v| ((*name).to_string(), value_text(v)))
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Descriptor table
// ---------------------------------------------------------------------------

/// Which parameters a direct request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamPolicy {
    /// None at all.
    Empty,
    /// Only the listed names.
    Select(&'static [&'static str]),
    /// The listed names when `gate` is present, nothing otherwise.
    Gated {
        gate: &'static str,
        names: &'static [&'static str],
    },
    /// Everything the caller supplied.
    All,
}

/// Request shape of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpDescriptor {
    pub name: &'static str,
    pub params: ParamPolicy,
    /// Parameters that must be present.
    pub required: &'static [&'static str],
    /// Retry a 405-refused GET once as a form-encoded POST.
    pub post_on_405: bool,
}

/// Shape used for operations missing from [`OPERATIONS`].
pub const DEFAULT_OPERATION: OpDescriptor = OpDescriptor {
    name: "*",
    params: ParamPolicy::All,
    required: &[],
    post_on_405: false,
};

/// Known Haystack operations.
pub static OPERATIONS: &[OpDescriptor] = &[
    OpDescriptor {
        name: "about",
        params: ParamPolicy::Empty,
        required: &[],
        post_on_405: false,
    },
    OpDescriptor {
        name: "ops",
        params: ParamPolicy::Empty,
        required: &[],
        post_on_405: false,
    },
    OpDescriptor {
        name: "formats",
        params: ParamPolicy::Empty,
        required: &[],
        post_on_405: false,
    },
    OpDescriptor {
        name: "read",
        params: ParamPolicy::Gated {
            gate: "filter",
            names: &["filter", "limit"],
        },
        required: &[],
        post_on_405: false,
    },
    OpDescriptor {
        name: "hisRead",
        params: ParamPolicy::Select(&["id", "range"]),
        required: &["id", "range"],
        post_on_405: false,
    },
    OpDescriptor {
        name: "nav",
        params: ParamPolicy::Select(&["navId"]),
        required: &[],
        post_on_405: false,
    },
    OpDescriptor {
        name: "watchSub",
        params: ParamPolicy::All,
        required: &[],
        post_on_405: true,
    },
    OpDescriptor {
        name: "watchPoll",
        params: ParamPolicy::All,
        required: &[],
        post_on_405: true,
    },
    OpDescriptor {
        name: "watchUnsub",
        params: ParamPolicy::All,
        required: &[],
        post_on_405: true,
    },
    OpDescriptor {
        name: "pointWrite",
        params: ParamPolicy::All,
        required: &[],
        post_on_405: true,
    },
];

/// Descriptor for `op`, falling back to [`DEFAULT_OPERATION`].
pub fn descriptor(op: &str) -> &'static OpDescriptor {
    OPERATIONS
        .iter()
        .find(|d| d.name == op)
        .unwrap_or(&DEFAULT_OPERATION)
}

// ---------------------------------------------------------------------------
// Request plans
// ---------------------------------------------------------------------------

/// How parameters travel.
#[derive(Debug, Clone, PartialEq)]
pub enum Encoding {
    None,
    Query(Vec<(String, String)>),
    /// `application/x-www-form-urlencoded` body.
    Form(Vec<(String, String)>),
    Json(Value),
}

/// A fully resolved request, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPlan {
    pub method: Method,
    pub url: String,
    pub encoding: Encoding,
    /// Whether a 405 answer earns one POST retry.
    pub post_on_405: bool,
}

impl RequestPlan {
    /// The POST retry for a 405-refused GET: same URL, the query parameters
    /// moved into a form body, and no further retry.
    pub fn as_form_post(&self) -> RequestPlan {
        let pairs = match &self.encoding {
            Encoding::Query(pairs) | Encoding::Form(pairs) => pairs.clone(),
            Encoding::None | Encoding::Json(_) => Vec::new(),
        };
        RequestPlan {
            method: Method::POST,
            url: self.url.clone(),
            encoding: Encoding::Form(pairs),
            post_on_405: false,
        }
    }
}

/// Build the request for `op` against `endpoint`.
///
/// # Errors
///
/// Returns [`HaystackError::MissingParameter`] when a direct operation lacks a
/// required parameter, or [`HaystackError::Serialization`] if relay params
/// cannot be encoded.
pub fn build_request(
    endpoint: &Endpoint,
    op: &str,
    params: Option<&Params>,
) -> Result<RequestPlan> {
    match endpoint.route {
        Route::Relay => {
            let body = serde_json::to_value(RelayRequest {
                operation: op,
                params: params.cloned().unwrap_or_default(),
            })?;
            Ok(RequestPlan {
                method: Method::POST,
                url: format!("{}{RELAY_PATH}", endpoint.base_url),
                encoding: Encoding::Json(body),
                post_on_405: false,
            })
        }
        Route::Direct => {
            let descriptor = descriptor(op);
            let empty = Params::new();
            let params = params.unwrap_or(&empty);

            if let Some(missing) = descriptor.required.iter().find(|name| !params.has(name)) {
                return Err(HaystackError::MissingParameter {
                    operation: op.to_string(),
                    parameter: (*missing).to_string(),
                });
            }

            let pairs = match descriptor.params {
                ParamPolicy::Empty => Vec::new(),
                ParamPolicy::Select(names) => params.select(names),
                ParamPolicy::Gated { gate, names } if params.has(gate) => params.select(names),
                ParamPolicy::Gated { .. } => Vec::new(),
                ParamPolicy::All => params.pairs(),
            };

            Ok(RequestPlan {
                method: Method::GET,
                url: format!("{}/{op}", endpoint.base_url),
                encoding: if pairs.is_empty() {
                    Encoding::None
                } else {
                    Encoding::Query(pairs)
                },
                post_on_405: descriptor.post_on_405,
            })
        }
    }
}
