// SPDX-License-Identifier: PMPL-1.0-or-later
//! Quote-aware field splitting for Zinc lines.

/// Which delimiters suspend splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Quoting {
    /// Header and meta lines: only double quotes.
    Quotes,
    /// Data rows: double quotes and backticks (URIs may contain commas).
    QuotesAndBackticks,
}

/// Split `line` on `separator`, ignoring separators inside quoted spans.
///
/// A backslash inside a quoted span escapes the next character, so `\"` does
/// not close the span. A quote character inside a backtick span (and the
/// reverse) is literal. Fields are trimmed; the number of fields is always
/// one more than the number of separators found outside quotes.
pub(crate) fn split_fields(line: &str, separator: char, quoting: Quoting) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut in_backticks = false;
    let mut escaped = false;

    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes || in_backticks => escaped = true,
            '"' if !in_backticks => in_quotes = !in_quotes,
            '`' if quoting == Quoting::QuotesAndBackticks && !in_quotes => {
                in_backticks = !in_backticks;
            }
            c if c == separator && !in_quotes && !in_backticks => {
                fields.push(line[start..idx].trim());
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    fields.push(line[start..].trim());
    fields
}
