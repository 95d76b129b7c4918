//! Parser for `show interface status | json` output.

use crate::error::StatusParseError;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static BREAKOUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(Ethernet\d+/\d+)/(\d+)$").unwrap());

const ABSENT_STATE: &str = "xcvrAbsent";

/// One row of the interface status table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusRow {
    pub interface: String,
    pub name: String,
    pub state: String,
    pub vlan: String,
    pub duplex: String,
    pub speed: String,
    /// Type column as reported by the status command itself
    pub xcvr_type: String,
}

impl StatusRow {
    pub fn is_xcvr_absent(&self) -> bool {
        self.state.eq_ignore_ascii_case(ABSENT_STATE)
    }

    /// Only front-panel Ethernet ports with an optic fitted get a SPROM query.
    pub fn needs_sprom(&self) -> bool {
        self.interface.starts_with("Ethernet") && !self.is_xcvr_absent()
    }

    fn from_value(row: &Value) -> Result<Self, StatusParseError> {
        if !row.is_object() {
            return Err(StatusParseError::MalformedRow(row.to_string()));
        }
        Ok(Self {
            interface: field_str(row, "interface"),
            name: field_str(row, "name"),
            state: field_str(row, "state"),
            vlan: field_str(row, "vlan"),
            duplex: field_str(row, "duplex"),
            speed: field_str(row, "speed"),
            xcvr_type: field_str(row, "type"),
        })
    }
}

/// Parse the status table.
///
/// `ROW_interface` is a list on most switches but collapses to a bare object
/// when only one interface is reported; both forms are accepted. A missing
/// table reads as no interfaces.
pub fn parse_status(raw: &str) -> Result<Vec<StatusRow>, StatusParseError> {
    let root: Value = serde_json::from_str(raw)?;
    if !root.is_object() {
        return Err(StatusParseError::MalformedRow(
            "top level is not an object".to_string(),
        ));
    }

    let rows = match root.get("TABLE_interface").and_then(|t| t.get("ROW_interface")) {
        Some(Value::Array(rows)) => rows
            .iter()
            .map(StatusRow::from_value)
            .collect::<Result<Vec<_>, _>>()?,
        Some(row) => vec![StatusRow::from_value(row)?],
        None => Vec::new(),
    };

    Ok(rows)
}

/// Interface whose SPROM represents the physical port.
///
/// Breakout sub-ports `EthernetA/B/C` share the optic of `EthernetA/B/1`.
/// Anything else is its own representative.
pub fn sprom_query_interface(interface: &str) -> String {
    match BREAKOUT_RE.captures(interface) {
        Some(caps) => format!("{}/1", &caps[1]),
        None => interface.to_string(),
    }
}

fn field_str(row: &Value, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
