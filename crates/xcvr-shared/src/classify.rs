//! Transceiver type classification.
//!
//! Some 800G OSFP optics still report a pre-standard type string in SPROM.
//! The table below maps those strings, when the lane layout and connector
//! confirm the optic, to the type the platform expects.

use crate::parsers::AttributeRecord;

/// One row of the rewrite table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub name: &'static str,
    pub types: &'static [&'static str],
    pub connectors: &'static [&'static str],
    pub host_lanes: u32,
    pub media_lanes: u32,
    pub replacement: &'static str,
}

impl Rule {
    pub fn matches(&self, record: &AttributeRecord) -> bool {
        self.types.contains(&record.original_type.as_str())
            && record.host_lane_count == self.host_lanes
            && record.media_lane_count == self.media_lanes
            && self.connectors.contains(&record.connector_code.as_str())
    }
}

const LC_CONNECTORS: &[&str] = &["0x07 (LC)"];
const MPO_CONNECTORS: &[&str] = &["0x27 (MPO 2x12)", "0x0c (MPO)"];

/// Rewrite table, evaluated in order. Type sets are disjoint across rows.
pub static RULES: [Rule; 4] = [
    Rule {
        name: "A",
        types: &["OSFP-2x400G-FR4", "OSFP-800G-DR8-2"],
        connectors: LC_CONNECTORS,
        host_lanes: 8,
        media_lanes: 8,
        replacement: "800G-2FR4-OSFP112",
    },
    Rule {
        name: "B",
        types: &["OSFP-800G-DR8", "OSFP-2x400G-DR4"],
        connectors: MPO_CONNECTORS,
        host_lanes: 8,
        media_lanes: 8,
        replacement: "800G-2DR4-OSFP112",
    },
    Rule {
        name: "C",
        types: &["OSFP-800G-VR8", "OSFP-2x400G-VR4"],
        connectors: MPO_CONNECTORS,
        host_lanes: 8,
        media_lanes: 8,
        replacement: "800G-2VR4-OSFP112",
    },
    Rule {
        name: "D",
        types: &["OSFP-800G-SR8", "OSFP-2x400G-SR4"],
        connectors: MPO_CONNECTORS,
        host_lanes: 8,
        media_lanes: 8,
        replacement: "800G-2SR4-OSFP112",
    },
];

/// Outcome of classifying one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub original_type: String,
    pub final_type: String,
    /// Name of the rule that fired, if any
    pub rule: Option<&'static str>,
}

impl Decision {
    pub fn unchanged(original_type: impl Into<String>) -> Self {
        let original_type = original_type.into();
        Self {
            final_type: original_type.clone(),
            original_type,
            rule: None,
        }
    }

    pub fn is_modified(&self) -> bool {
        self.final_type != self.original_type
    }
}

/// Classify against [`RULES`].
pub fn classify(record: &AttributeRecord) -> Decision {
    classify_with(&RULES, record)
}

/// Classify against an arbitrary table. The first matching rule wins.
pub fn classify_with(rules: &[Rule], record: &AttributeRecord) -> Decision {
    match rules.iter().find(|rule| rule.matches(record)) {
        Some(rule) => Decision {
            original_type: record.original_type.clone(),
            final_type: rule.replacement.to_string(),
            rule: Some(rule.name),
        },
        None => Decision::unchanged(record.original_type.as_str()),
    }
}

/// Every rule in [`RULES`] whose predicate holds. More than one entry means
/// the table is ambiguous for this record.
pub fn matching_rules(record: &AttributeRecord) -> Vec<&'static Rule> {
    RULES.iter().filter(|rule| rule.matches(record)).collect()
}
