//! Device CLI commands issued by xcvrctl.

pub const STATUS: &str = "show interface status | json";

pub fn sprom(interface: &str) -> String {
    format!("show interface {} transceiver sprom", interface)
}

pub fn details_text(interface: &str) -> String {
    format!(
        "show interface {} transceiver details | begin \"Lane Number:\"",
        interface
    )
}

pub fn details_json(interface: &str) -> String {
    format!("show interface {} transceiver details | json", interface)
}
