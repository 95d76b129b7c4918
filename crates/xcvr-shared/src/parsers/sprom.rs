//! Parser for `show interface <intf> transceiver sprom` output.
//!
//! Pulls out the handful of fields the classifier needs. Everything else in
//! the SPROM dump is left alone; the raw text is kept so the rewriter can
//! splice the corrected type back into it.

use crate::error::ExtractError;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static CONNECTOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Connector\s+:\s+(.*)").unwrap());

const TYPE_MARKER: &str = "type is";
const HOST_LANES_MARKER: &str = "host lane count is";
const MEDIA_LANES_MARKER: &str = "media lane count is";
const PART_NUMBER_MARKER: &str = "part number is";
const NOT_PRESENT_MARKER: &str = "transceiver is not present";

/// Fields extracted from one interface's SPROM output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRecord {
    pub original_type: String,
    pub host_lane_count: u32,
    pub media_lane_count: u32,
    /// Connector code as printed, e.g. `0x0c (MPO)`
    pub connector_code: String,
    pub part_number: Option<String>,
    /// Full SPROM output this record was read from
    pub raw_text: String,
}

impl AttributeRecord {
    /// Build a record from already-known field values, with no backing text.
    pub fn new(
        original_type: impl Into<String>,
        host_lane_count: u32,
        media_lane_count: u32,
        connector_code: impl Into<String>,
    ) -> Self {
        Self {
            original_type: original_type.into(),
            host_lane_count,
            media_lane_count,
            connector_code: connector_code.into(),
            part_number: None,
            raw_text: String::new(),
        }
    }
}

/// Location of the `type is <value>` field inside a SPROM dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeField {
    pub value: String,
    /// Byte range of `value` within the source text
    pub span: Range<usize>,
}

/// Find the first line whose trimmed text starts with `type is` and carries
/// a value.
///
/// The span covers the value only: the keyword, the whitespace around it,
/// trailing blanks and the line terminator are all outside it.
pub fn find_type_field(raw: &str) -> Option<TypeField> {
    let mut offset = 0;

    for line in raw.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        let indent = content.len() - content.trim_start().len();
        let body = &content[indent..];

        if let Some(rest) = body.strip_prefix(TYPE_MARKER) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                let gap = rest.len() - rest.trim_start().len();
                let value = rest.trim();
                if !value.is_empty() {
                    let start = offset + indent + TYPE_MARKER.len() + gap;
                    return Some(TypeField {
                        value: value.to_string(),
                        span: start..start + value.len(),
                    });
                }
            }
        }

        offset += line.len();
    }

    None
}

/// Parse SPROM output into an [`AttributeRecord`].
///
/// Lane counts are compared as integers downstream, so `08` and `8` read the
/// same here.
pub fn extract(raw: &str) -> Result<AttributeRecord, ExtractError> {
    if raw.trim().is_empty() {
        return Err(ExtractError::Empty);
    }
    if raw.to_lowercase().contains(NOT_PRESENT_MARKER) {
        return Err(ExtractError::NotPresent);
    }

    let type_field = find_type_field(raw).ok_or(ExtractError::MissingField("type"))?;

    let mut host_raw: Option<&str> = None;
    let mut media_raw: Option<&str> = None;
    let mut connector: Option<String> = None;
    let mut part_number: Option<String> = None;

    for line in raw.lines() {
        if host_raw.is_none() {
            host_raw = token_after(line, HOST_LANES_MARKER);
        }
        if media_raw.is_none() {
            media_raw = token_after(line, MEDIA_LANES_MARKER);
        }
        if connector.is_none() {
            connector = CONNECTOR_RE
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|c| !c.is_empty());
        }
        if part_number.is_none() {
            part_number = line
                .trim()
                .strip_prefix(PART_NUMBER_MARKER)
                .map(|pn| pn.trim().to_string());
        }
    }

    let host_lane_count = parse_lane_count(
        "host lane count",
        host_raw.ok_or(ExtractError::MissingField("host lane count"))?,
    )?;
    let media_lane_count = parse_lane_count(
        "media lane count",
        media_raw.ok_or(ExtractError::MissingField("media lane count"))?,
    )?;
    let connector_code = connector.ok_or(ExtractError::MissingField("Connector"))?;

    Ok(AttributeRecord {
        original_type: type_field.value,
        host_lane_count,
        media_lane_count,
        connector_code,
        part_number,
        raw_text: raw.to_string(),
    })
}

/// First whitespace-separated token after `marker`, ignoring any units.
fn token_after<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let pos = line.find(marker)?;
    line[pos + marker.len()..].split_whitespace().next()
}

fn parse_lane_count(field: &'static str, raw: &str) -> Result<u32, ExtractError> {
    raw.parse::<u32>().map_err(|_| ExtractError::InvalidLaneCount {
        field,
        raw: raw.to_string(),
    })
}
