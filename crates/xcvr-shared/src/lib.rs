//! Shared pipeline for transceiver type normalization.
//!
//! Parse SPROM output, classify the reported type against the rewrite table,
//! and splice the corrected type back into text or JSON. No I/O happens here;
//! `xcvrctl` owns the device channel and the query fan-out.

pub mod classify;
pub mod error;
pub mod parsers;
pub mod render;
pub mod rewrite;

pub use classify::{classify, matching_rules, Decision, Rule, RULES};
pub use error::{ExtractError, RewriteError, StatusParseError};
pub use parsers::{extract, parse_status, sprom_query_interface, AttributeRecord, StatusRow};
pub use rewrite::{compact_json, rewrite_json_field, rewrite_text, OutputMode};
