//! Device output parsers.
//!
//! # Supported Outputs
//!
//! - `show interface <intf> transceiver sprom`: classification fields → `AttributeRecord`
//! - `show interface status | json`: interface table → `Vec<StatusRow>`
//!
//! Parsers are pure. Failures come back as typed errors so callers can decide
//! whether to fail open or report a placeholder.

pub mod sprom;
pub mod status;

pub use sprom::{extract, find_type_field, AttributeRecord, TypeField};
pub use status::{parse_status, sprom_query_interface, StatusRow};
