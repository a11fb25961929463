//! Minimal hand-rolled JSON helpers
//!
//! The API bodies are tiny and flat, so the firmware carries no JSON
//! dependency. Rendering goes through `core::fmt::Write`; parsing scans for
//! known keys by name. Escape sequences inside incoming string values are
//! not interpreted, which is acceptable for SSIDs and device names.

use core::fmt::{self, Write};

/// Write `s` as a quoted JSON string, escaping what the flat bodies can
/// actually contain.
pub fn write_json_string<W: Write>(buf: &mut W, s: &str) -> fmt::Result {
    buf.write_char('"')?;
    for ch in s.chars() {
        match ch {
            '"' => buf.write_str("\\\"")?,
            '\\' => buf.write_str("\\\\")?,
            '\n' => buf.write_str("\\n")?,
            '\r' => buf.write_str("\\r")?,
            '\t' => buf.write_str("\\t")?,
            c if c < ' ' => buf.write_char('?')?,
            c => buf.write_char(c)?,
        }
    }
    buf.write_char('"')
}

/// Shape of one top-level field in a request body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Key not present
    Absent,
    /// `"key": null`
    Null,
    /// `"key": true` / `"key": false`
    Bool(bool),
    /// `"key": "..."`, value borrowed without unescaping
    Str(&'a str),
    /// Present with a value shape the API never accepts
    Other,
}

/// Look up a top-level field by key.
///
/// Scans for the quoted key and classifies whatever follows the colon. The
/// scan does not track nesting; bodies here are single flat objects.
pub fn field<'a>(body: &'a str, key: &str) -> FieldValue<'a> {
    let mut needle_buf = heapless::String::<66>::new();
    if needle_buf.push('"').is_err()
        || needle_buf.push_str(key).is_err()
        || needle_buf.push('"').is_err()
    {
        return FieldValue::Absent;
    }

    let idx = match body.find(needle_buf.as_str()) {
        Some(idx) => idx,
        None => return FieldValue::Absent,
    };
    let colon = match body[idx..].find(':') {
        Some(colon) => colon,
        None => return FieldValue::Other,
    };
    let value = body[idx + colon + 1..].trim_start();

    if let Some(rest) = value.strip_prefix('"') {
        return match rest.find('"') {
            Some(end) => FieldValue::Str(&rest[..end]),
            None => FieldValue::Other,
        };
    }
    if value.starts_with("true") {
        return FieldValue::Bool(true);
    }
    if value.starts_with("false") {
        return FieldValue::Bool(false);
    }
    if value.starts_with("null") {
        return FieldValue::Null;
    }
    FieldValue::Other
}
