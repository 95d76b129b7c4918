//! Text rendering for single-interface reports and the status table.

use crate::parsers::StatusRow;

pub const SPROM_BANNER: &str = "--- Collected and Modified Transceiver Information ---";
pub const DETAILS_BANNER: &str = "--- Transceiver Details (Lane Information) ---";
pub const STATUS_BANNER: &str = "--- Modified Interface Status ---";
pub const NO_STATUS_DATA: &str =
    "No interface data found in 'show interface status | json' output.";

/// Type column value for rows with no usable SPROM.
pub const PLACEHOLDER: &str = "--";

/// Status table columns and their widths.
pub const COLUMNS: [(&str, usize); 7] = [
    ("Port", 15),
    ("Name", 19),
    ("Status", 9),
    ("Vlan", 9),
    ("Duplex", 7),
    ("Speed", 8),
    ("Type", 25),
];

const NAME_WIDTH: usize = COLUMNS[1].1;
const STATUS_WIDTH: usize = COLUMNS[2].1;

/// A status row paired with the type to show for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub row: StatusRow,
    pub display_type: String,
}

/// Append the lane details section, or the error that prevented it.
pub fn append_details(mut text: String, details: Result<&str, &str>) -> String {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    match details {
        Ok(output) => {
            text.push('\n');
            text.push_str(DETAILS_BANNER);
            text.push('\n');
            text.push_str(output);
        }
        Err(e) => {
            text.push_str(&format!("\nError collecting transceiver details: {}", e));
        }
    }
    text
}

/// Render the status table: header, dashed separator, one line per row.
pub fn render_status_table(lines: &[StatusLine]) -> String {
    let header: Vec<String> = COLUMNS
        .iter()
        .map(|(title, width)| pad(title, *width))
        .collect();
    let separator: Vec<String> = COLUMNS.iter().map(|(_, width)| "-".repeat(*width)).collect();

    let mut out = vec![header.join(" "), separator.join(" ")];
    for line in lines {
        let cells = [
            line.row.interface.replace("Ethernet", "Eth"),
            truncate(&line.row.name, NAME_WIDTH),
            truncate(&line.row.state.replace("xcvrAbsent", "xcvrAbsen"), STATUS_WIDTH),
            line.row.vlan.clone(),
            line.row.duplex.clone(),
            line.row.speed.clone(),
            line.display_type.clone(),
        ];
        let padded: Vec<String> = cells
            .iter()
            .zip(COLUMNS.iter())
            .map(|(cell, (_, width))| pad(cell, *width))
            .collect();
        out.push(padded.join(" "));
    }

    out.join("\n")
}

fn pad(cell: &str, width: usize) -> String {
    format!("{:<width$}", cell, width = width)
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
