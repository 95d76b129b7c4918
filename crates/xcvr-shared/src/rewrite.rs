//! Type-field substitution.
//!
//! Every rewrite is a splice at a located byte span. The new type goes in as
//! a literal; nothing here runs a replacement template over it.

use crate::classify::Decision;
use crate::error::RewriteError;
use crate::parsers::find_type_field;
use serde::de::IgnoredAny;
use std::ops::Range;

/// How a single-interface result is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// SPROM text only
    Text,
    /// SPROM text followed by the lane details text
    TextWithDetails,
    /// `{"type":"..."}`
    CompactJson,
    /// Full details JSON with its type field replaced
    DetailsJson,
}

impl OutputMode {
    pub fn from_flags(json: bool, details: bool) -> Self {
        match (json, details) {
            (false, false) => Self::Text,
            (false, true) => Self::TextWithDetails,
            (true, false) => Self::CompactJson,
            (true, true) => Self::DetailsJson,
        }
    }
}

/// Replace the value of the `type is` line with the decision's final type.
///
/// The text is returned unchanged when no type line exists or when it does
/// not carry the decision's original type.
pub fn rewrite_text(raw: &str, decision: &Decision) -> String {
    if !decision.is_modified() {
        return raw.to_string();
    }
    match find_type_field(raw) {
        Some(field) if field.value == decision.original_type => {
            splice(raw, field.span, &decision.final_type)
        }
        _ => raw.to_string(),
    }
}

/// Replace the first string value of object key `key` that equals the
/// decision's original type. Only that literal's bytes change.
pub fn rewrite_json_field(
    raw: &str,
    key: &str,
    decision: &Decision,
) -> Result<String, RewriteError> {
    serde_json::from_str::<IgnoredAny>(raw)?;
    if !decision.is_modified() {
        return Ok(raw.to_string());
    }

    match find_json_string_value(raw, key, &decision.original_type)? {
        Some(span) => {
            let literal = serde_json::to_string(&decision.final_type)?;
            Ok(splice(raw, span, &literal))
        }
        None => Ok(raw.to_string()),
    }
}

/// Compact single-field wrapper.
pub fn compact_json(decision: &Decision) -> String {
    serde_json::json!({ "type": decision.final_type }).to_string()
}

/// Span of the string literal (quotes included) for the first `key: "want"`
/// pair. Input must already be valid JSON.
fn find_json_string_value(
    raw: &str,
    key: &str,
    want: &str,
) -> Result<Option<Range<usize>>, RewriteError> {
    let bytes = raw.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'"' {
            i += 1;
            continue;
        }

        let key_end = string_end(bytes, i)?;
        let colon = skip_ws(bytes, key_end);
        if bytes.get(colon) == Some(&b':') && serde_json::from_str::<String>(&raw[i..key_end])? == key
        {
            let value_start = skip_ws(bytes, colon + 1);
            if bytes.get(value_start) == Some(&b'"') {
                let value_end = string_end(bytes, value_start)?;
                if serde_json::from_str::<String>(&raw[value_start..value_end])? == want {
                    return Ok(Some(value_start..value_end));
                }
                i = value_end;
                continue;
            }
        }
        i = key_end;
    }

    Ok(None)
}

/// Index just past the closing quote of the literal opening at `start`.
fn string_end(bytes: &[u8], start: usize) -> Result<usize, RewriteError> {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err(RewriteError::UnterminatedString(start))
}

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t' | b'\n' | b'\r') {
        i += 1;
    }
    i
}

fn splice(raw: &str, span: Range<usize>, value: &str) -> String {
    let mut out = String::with_capacity(raw.len() - span.len() + value.len());
    out.push_str(&raw[..span.start]);
    out.push_str(value);
    out.push_str(&raw[span.end..]);
    out
}
