// SPDX-License-Identifier: PMPL-1.0-or-later
//! Scalar cell values and the cell decoder.
//!
//! [`decode`] is total: it never fails. Text that matches no known prefix is
//! returned unchanged as [`Scalar::Str`], and a malformed number falls back to
//! its original text, so one bad cell cannot abort a whole grid.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker tokens. `m:` comes from Haystack JSON v3; the check mark is how some
/// encoders render a marker in text grids.
const MARKER_TOKENS: [&str; 2] = ["m:", "\u{2713}"];

/// Prefixes of date, time and timestamp cells. Their text is kept raw.
const DATE_TIME_PREFIXES: [&str; 3] = ["d:", "t:", "ts:"];

/// A single decoded grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "val", rename_all = "camelCase")]
pub enum Scalar {
    /// Missing value (`N`, an empty cell, or a padded trailing column).
    Null,
    /// A boolean. Only produced by JSON payloads.
    Bool(bool),
    /// Presence-only tag. Distinct from `Bool(true)`.
    Marker,
    /// A number with an optional unit such as `°F` or `kW`.
    Number {
        value: f64,
        unit: Option<String>,
    },
    /// Plain string.
    Str(String),
    /// A URI taken from between backticks.
    Uri(String),
    /// Entity reference, raw text including its `r:` prefix.
    Ref(String),
    /// Date, time or timestamp text without its type prefix. No timezone
    /// handling is applied.
    DateTimeText(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, Scalar::Marker)
    }

    /// Numeric value of a `Number` cell.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Borrow the text of the textual variants.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) | Scalar::Uri(s) | Scalar::Ref(s) | Scalar::DateTimeText(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness used by tag checks: markers and `Bool(true)` count as set.
    pub fn is_truthy(&self) -> bool {
        matches!(self, Scalar::Marker | Scalar::Bool(true))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Marker => f.write_str("\u{2713}"),
            Scalar::Number { value, unit: Some(unit) } => write!(f, "{value} {unit}"),
            Scalar::Number { value, unit: None } => write!(f, "{value}"),
            Scalar::Str(s) | Scalar::Uri(s) | Scalar::Ref(s) | Scalar::DateTimeText(s) => {
                f.write_str(s)
            }
        }
    }
}

/// Decode one cell. `cell` is expected to be trimmed already.
///
/// Rules are applied in order:
///
/// 1. empty or `N` gives [`Scalar::Null`]
/// 2. `"..."` gives [`Scalar::Str`] of the inner text
/// 3. `` `...` `` gives [`Scalar::Uri`] of the inner text
/// 4. `r:...` gives [`Scalar::Ref`] of the whole text
/// 5. `m:` or `✓` gives [`Scalar::Marker`]
/// 6. `n:<num>[ <unit>]` gives [`Scalar::Number`], or the original text on a
///    parse failure
/// 7. `d:`, `t:`, `ts:` give [`Scalar::DateTimeText`] without the prefix
/// 8. `s:...` gives [`Scalar::Str`] without the prefix
/// 9. anything else is returned as [`Scalar::Str`] unchanged
pub fn decode(cell: &str) -> Scalar {
    if cell.is_empty() || cell == "N" {
        return Scalar::Null;
    }
    if let Some(inner) = strip_bounding(cell, '"') {
        return Scalar::Str(inner.to_owned());
    }
    if let Some(inner) = strip_bounding(cell, '`') {
        return Scalar::Uri(inner.to_owned());
    }
    if cell.starts_with("r:") {
        return Scalar::Ref(cell.to_owned());
    }
    if MARKER_TOKENS.contains(&cell) {
        return Scalar::Marker;
    }
    if let Some(rest) = cell.strip_prefix("n:") {
        return decode_number(cell, rest);
    }
    for prefix in DATE_TIME_PREFIXES {
        if let Some(rest) = cell.strip_prefix(prefix) {
            return Scalar::DateTimeText(rest.to_owned());
        }
    }
    if let Some(rest) = cell.strip_prefix("s:") {
        return Scalar::Str(rest.to_owned());
    }
    Scalar::Str(cell.to_owned())
}

fn strip_bounding(cell: &str, bound: char) -> Option<&str> {
    cell.strip_prefix(bound)?.strip_suffix(bound)
}

fn decode_number(original: &str, rest: &str) -> Scalar {
    let (number, unit) = match rest.split_once(' ') {
        Some((number, unit)) => (number, Some(unit.trim())),
        None => (rest, None),
    };

    match number.trim().parse::<f64>() {
        Ok(value) => Scalar::Number {
            value,
            unit: unit.filter(|u| !u.is_empty()).map(str::to_owned),
        },
        Err(_) => Scalar::Str(original.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_forms() {
        assert_eq!(decode(""), Scalar::Null);
        assert_eq!(decode("N"), Scalar::Null);
    }

    #[test]
    fn test_quoted_string_keeps_inner_text() {
        assert_eq!(decode("\"Room, 101\""), Scalar::Str("Room, 101".into()));
        assert_eq!(decode("\"\""), Scalar::Str(String::new()));
        // A lone quote is not bounded.
        assert_eq!(decode("\""), Scalar::Str("\"".into()));
    }

    #[test]
    fn test_uri() {
        assert_eq!(decode("`https://x`"), Scalar::Uri("https://x".into()));
    }

    #[test]
    fn test_ref_keeps_prefix() {
        assert_eq!(decode("r:p1"), Scalar::Ref("r:p1".into()));
        assert_eq!(decode("r:p1 Zone Temp"), Scalar::Ref("r:p1 Zone Temp".into()));
    }

    #[test]
    fn test_markers() {
        assert_eq!(decode("m:"), Scalar::Marker);
        assert_eq!(decode("\u{2713}"), Scalar::Marker);
        assert!(decode("m:").is_truthy());
        assert_ne!(decode("m:"), Scalar::Bool(true));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            decode("n:72.5 °F"),
            Scalar::Number {
                value: 72.5,
                unit: Some("°F".into())
            }
        );
        assert_eq!(
            decode("n:-3"),
            Scalar::Number {
                value: -3.0,
                unit: None
            }
        );
        assert_eq!(
            decode("n:12 "),
            Scalar::Number {
                value: 12.0,
                unit: None
            }
        );
    }

    #[test]
    fn test_number_parse_failure_falls_back_to_text() {
        assert_eq!(decode("n:abc"), Scalar::Str("n:abc".into()));
        assert_eq!(decode("n:"), Scalar::Str("n:".into()));
    }

    #[test]
    fn test_date_time_prefixes_are_stripped() {
        assert_eq!(decode("d:2024-01-01"), Scalar::DateTimeText("2024-01-01".into()));
        assert_eq!(decode("t:08:30:00"), Scalar::DateTimeText("08:30:00".into()));
        assert_eq!(
            decode("ts:2024-01-01T08:30:00-05:00 New_York"),
            Scalar::DateTimeText("2024-01-01T08:30:00-05:00 New_York".into())
        );
    }

    #[test]
    fn test_string_prefix() {
        assert_eq!(decode("s:hello"), Scalar::Str("hello".into()));
    }

    #[test]
    fn test_unknown_text_passes_through() {
        assert_eq!(decode("@p1"), Scalar::Str("@p1".into()));
        assert_eq!(decode("x:whatever"), Scalar::Str("x:whatever".into()));
        assert_eq!(decode("M"), Scalar::Str("M".into()));
    }

    #[test]
    fn test_display() {
        assert_eq!(decode("n:72.5 °F").to_string(), "72.5 °F");
        assert_eq!(Scalar::Null.to_string(), "");
        assert_eq!(decode("r:p1").to_string(), "r:p1");
    }
}
