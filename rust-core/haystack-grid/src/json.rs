// SPDX-License-Identifier: PMPL-1.0-or-later
//! JSON grid decoding.
//!
//! Accepts the Haystack JSON grid shape (`meta`, `cols`, `rows`). String cells
//! carry the same type prefixes as Zinc (`m:`, `n:72 °F`, `r:id`) and go
//! through the scalar decoder; Haystack 4 kind objects (`{"_kind": "number",
//! "val": 72, "unit": "°F"}`) are mapped to the matching variant.
//!
//! A flat object without `cols` or `rows` is read as a single-row grid, which
//! is what some gateways answer for `about`.

use serde_json::{Map, Value};

use crate::error::{GridError, GridResult};
use crate::grid::{Grid, Meta, Row};
use crate::scalar::{self, Scalar};

/// Parse and decode a JSON body.
///
/// # Errors
///
/// [`GridError::Json`] if the body is not JSON, [`GridError::InvalidFormat`]
/// if it is not a grid-shaped object.
pub fn decode_json_str(body: &str) -> GridResult<Grid> {
    let value: Value = serde_json::from_str(body)?;
    decode_json_grid(&value)
}

/// Decode an already-parsed JSON grid.
///
/// # Errors
///
/// Returns [`GridError::InvalidFormat`] if `value` is not an object or its
/// `cols`/`rows` members are not arrays.
pub fn decode_json_grid(value: &Value) -> GridResult<Grid> {
    let Value::Object(object) = value else {
        return Err(GridError::InvalidFormat(format!(
            "expected a JSON object, found {}",
            json_kind(value)
        )));
    };

    if !object.contains_key("rows") && !object.contains_key("cols") {
        let row: Row = object
            .iter()
            .filter(|(key, _)| key.as_str() != "meta" && key.as_str() != "_kind")
            .map(|(key, value)| (key.clone(), decode_json_value(value)))
            .collect();
        let columns = object
            .keys()
            .filter(|key| row.contains_key(key.as_str()))
            .cloned()
            .collect();
        return Ok(Grid::from_parts(columns, vec![row], decode_meta(object)));
    }

    let columns = match object.get("cols") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(cols)) => cols.iter().filter_map(column_name).collect(),
        Some(other) => {
            return Err(GridError::InvalidFormat(format!(
                "`cols` must be an array, found {}",
                json_kind(other)
            )))
        }
    };

    let rows = match object.get("rows") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(rows)) => rows
            .iter()
            .filter_map(Value::as_object)
            .map(|row| {
                row.iter()
                    .map(|(key, value)| (key.clone(), decode_json_value(value)))
                    .collect::<Row>()
            })
            .collect(),
        Some(other) => {
            return Err(GridError::InvalidFormat(format!(
                "`rows` must be an array, found {}",
                json_kind(other)
            )))
        }
    };

    Ok(Grid::from_parts(columns, rows, decode_meta(object)))
}

/// Decode a single JSON cell.
pub fn decode_json_value(value: &Value) -> Scalar {
    match value {
        Value::Null => Scalar::Null,
        Value::Bool(b) => Scalar::Bool(*b),
        Value::Number(n) => n.as_f64().map_or_else(
            || Scalar::Str(n.to_string()),
            |value| Scalar::Number { value, unit: None },
        ),
        Value::String(s) => scalar::decode(s.trim()),
        Value::Object(map) => decode_kind(map).unwrap_or_else(|| Scalar::Str(value.to_string())),
        Value::Array(_) => Scalar::Str(value.to_string()),
    }
}

fn decode_kind(map: &Map<String, Value>) -> Option<Scalar> {
    let kind = map.get("_kind")?.as_str()?;
    let val = map.get("val");
    let text = || val.and_then(Value::as_str).map(str::to_owned);

    match kind {
        "marker" => Some(Scalar::Marker),
        "remove" | "na" => Some(Scalar::Null),
        "number" => {
            let value = match val? {
                Value::Number(n) => n.as_f64()?,
                Value::String(s) => parse_special_number(s)?,
                _ => return None,
            };
            let unit = map.get("unit").and_then(Value::as_str).map(str::to_owned);
            Some(Scalar::Number { value, unit })
        }
        "ref" => text().map(|id| Scalar::Ref(format!("r:{id}"))),
        "uri" => text().map(Scalar::Uri),
        "date" | "time" | "dateTime" => text().map(Scalar::DateTimeText),
        "str" => text().map(Scalar::Str),
        _ => None,
    }
}

fn parse_special_number(text: &str) -> Option<f64> {
    match text {
        "INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        other => other.parse().ok(),
    }
}

fn column_name(col: &Value) -> Option<String> {
    match col {
        Value::String(name) => Some(name.clone()),
        Value::Object(map) => map.get("name").and_then(Value::as_str).map(str::to_owned),
        _ => None,
    }
}

fn decode_meta(object: &Map<String, Value>) -> Meta {
    let Some(Value::Object(meta)) = object.get("meta") else {
        return Meta::new();
    };
    meta.iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
