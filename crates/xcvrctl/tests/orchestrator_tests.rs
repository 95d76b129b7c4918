//! Orchestrator tests against an in-memory device channel.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use xcvr_shared::render::{DETAILS_BANNER, SPROM_BANNER, STATUS_BANNER};
use xcvr_shared::OutputMode;
use xcvrctl::config::QueryConfig;
use async_trait::async_trait;
use xcvrctl::errors::{exit_code_for, EXIT_CHANNEL_UNAVAILABLE};
use xcvrctl::{ChannelError, CommandChannel, Orchestrator, Request};

#[derive(Default)]
struct FakeChannel {
    responses: HashMap<String, Result<String, ChannelError>>,
    calls: Mutex<Vec<String>>,
}

impl FakeChannel {
    fn respond(mut self, command: &str, output: &str) -> Self {
        self.responses
            .insert(command.to_string(), Ok(output.to_string()));
        self
    }

    fn fail(mut self, command: &str) -> Self {
        self.responses.insert(
            command.to_string(),
            Err(ChannelError::CommandFailed {
                command: command.to_string(),
                code: Some(16),
                stderr: "% Invalid command".to_string(),
            }),
        );
        self
    }

    fn unavailable(mut self, command: &str) -> Self {
        self.responses.insert(
            command.to_string(),
            Err(ChannelError::Unavailable {
                program: "vsh".to_string(),
                reason: "permission denied".to_string(),
            }),
        );
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandChannel for FakeChannel {
    async fn run(&self, command: &str) -> Result<String, ChannelError> {
        self.calls.lock().unwrap().push(command.to_string());
        self.responses.get(command).cloned().unwrap_or_else(|| {
            Err(ChannelError::CommandFailed {
                command: command.to_string(),
                code: Some(16),
                stderr: "% Invalid command".to_string(),
            })
        })
    }
}

struct UnavailableChannel;

#[async_trait]
impl CommandChannel for UnavailableChannel {
    async fn run(&self, _command: &str) -> Result<String, ChannelError> {
        Err(ChannelError::Unavailable {
            program: "vsh".to_string(),
            reason: "program not found".to_string(),
        })
    }
}

fn sprom(interface: &str, ty: &str, host: &str, media: &str, connector: &str) -> String {
    format!(
        "{interface}\n    transceiver is present\n    type is {ty}\n    name is CISCO-INNOLIGHT\n    part number is T-OL8CNT-NC1\n    host lane count is {host}\n    media lane count is {media}\n  Connector          : {connector}\n"
    )
}

fn sprom_cmd(interface: &str) -> String {
    format!("show interface {} transceiver sprom", interface)
}

fn orchestrator(channel: Arc<dyn CommandChannel>) -> Orchestrator {
    Orchestrator::new(channel, QueryConfig::default())
}

#[tokio::test]
async fn test_single_text_shows_only_new_type() {
    let raw = sprom("Ethernet1/57/1", "OSFP-800G-DR8", "8", "8", "0x0c (MPO)");
    let channel = Arc::new(FakeChannel::default().respond(&sprom_cmd("Ethernet1/57/1"), &raw));

    let out = orchestrator(channel)
        .single("Ethernet1/57/1", OutputMode::Text)
        .await
        .unwrap();

    let expected = raw.replace("type is OSFP-800G-DR8", "type is 800G-2DR4-OSFP112");
    assert_eq!(out, format!("{}\n{}", SPROM_BANNER, expected));
    assert!(!out.contains("OSFP-800G-DR8(800G-2DR4-OSFP112)"));
}

#[tokio::test]
async fn test_single_text_no_match_is_verbatim() {
    let raw = sprom("Ethernet1/1", "OSFP-800G-SR8", "4", "8", "0x27 (MPO 2x12)");
    let channel = Arc::new(FakeChannel::default().respond(&sprom_cmd("Ethernet1/1"), &raw));

    let out = orchestrator(channel)
        .single("Ethernet1/1", OutputMode::Text)
        .await
        .unwrap();
    assert_eq!(out, format!("{}\n{}", SPROM_BANNER, raw));
}

#[tokio::test]
async fn test_single_missing_fields_pass_through() {
    let raw = "Ethernet1/1\n    transceiver is present\n    type is OSFP-800G-DR8\n";
    let channel = Arc::new(FakeChannel::default().respond(&sprom_cmd("Ethernet1/1"), raw));

    let out = orchestrator(channel)
        .single("Ethernet1/1", OutputMode::Text)
        .await
        .unwrap();
    assert!(out.ends_with(raw));

    let channel = Arc::new(FakeChannel::default().respond(&sprom_cmd("Ethernet1/1"), raw));
    let json = orchestrator(channel)
        .single("Ethernet1/1", OutputMode::CompactJson)
        .await
        .unwrap();
    assert_eq!(json, r#"{"type":"OSFP-800G-DR8"}"#);
}

#[tokio::test]
async fn test_single_with_details() {
    let raw = sprom("Ethernet1/57/1", "OSFP-2x400G-FR4", "8", "8", "0x07 (LC)");
    let details_cmd = "show interface Ethernet1/57/1 transceiver details | begin \"Lane Number:\"";
    let channel = Arc::new(
        FakeChannel::default()
            .respond(&sprom_cmd("Ethernet1/57/1"), &raw)
            .respond(details_cmd, "Lane Number:1 Network Lane\n"),
    );

    let out = orchestrator(channel.clone())
        .single("Ethernet1/57/1", OutputMode::TextWithDetails)
        .await
        .unwrap();

    assert!(out.contains("    type is 800G-2FR4-OSFP112\n"));
    assert!(out.ends_with(&format!("\n\n{}\nLane Number:1 Network Lane\n", DETAILS_BANNER)));
    assert_eq!(channel.calls(), vec![sprom_cmd("Ethernet1/57/1"), details_cmd.to_string()]);
}

#[tokio::test]
async fn test_single_details_failure_still_prints_sprom() {
    let raw = sprom("Ethernet1/2", "OSFP-800G-DR8", "8", "8", "0x0c (MPO)");
    let channel = Arc::new(FakeChannel::default().respond(&sprom_cmd("Ethernet1/2"), &raw));

    let out = orchestrator(channel)
        .single("Ethernet1/2", OutputMode::TextWithDetails)
        .await
        .unwrap();

    assert!(out.contains("type is 800G-2DR4-OSFP112"));
    assert!(out.contains("Error collecting transceiver details:"));
    assert!(!out.contains(DETAILS_BANNER));
}

#[tokio::test]
async fn test_single_compact_json() {
    let raw = sprom("Ethernet1/3", "OSFP-2x400G-SR4", "8", "8", "0x0c (MPO)");
    let channel = Arc::new(FakeChannel::default().respond(&sprom_cmd("Ethernet1/3"), &raw));

    let out = orchestrator(channel)
        .single("Ethernet1/3", OutputMode::CompactJson)
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed, serde_json::json!({"type": "800G-2SR4-OSFP112"}));
}

#[tokio::test]
async fn test_single_details_json() {
    let raw = sprom("Ethernet1/4", "OSFP-800G-VR8", "8", "8", "0x27 (MPO 2x12)");
    let details = r#"{"TABLE_interface": {"ROW_interface": {"interface": "Ethernet1/4", "sfp": "present", "type": "OSFP-800G-VR8", "serialnum": "INL27150123"}}}"#;
    let channel = Arc::new(
        FakeChannel::default()
            .respond(&sprom_cmd("Ethernet1/4"), &raw)
            .respond("show interface Ethernet1/4 transceiver details | json", details),
    );

    let out = orchestrator(channel)
        .single("Ethernet1/4", OutputMode::DetailsJson)
        .await
        .unwrap();
    assert_eq!(out, details.replace("OSFP-800G-VR8", "800G-2VR4-OSFP112"));
}

#[tokio::test]
async fn test_single_not_present_is_error() {
    let channel = Arc::new(FakeChannel::default().respond(
        &sprom_cmd("Ethernet1/5"),
        "Ethernet1/5\n    transceiver is not present\n",
    ));

    let err = orchestrator(channel)
        .single("Ethernet1/5", OutputMode::Text)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("transceiver not present"));
}

#[tokio::test]
async fn test_unavailable_channel_is_fatal() {
    let err = orchestrator(Arc::new(UnavailableChannel))
        .run(&Request::Single {
            interface: "Ethernet1/1".to_string(),
            mode: OutputMode::Text,
        })
        .await
        .unwrap_err();
    assert_eq!(exit_code_for(&err), EXIT_CHANNEL_UNAVAILABLE);

    let err = orchestrator(Arc::new(UnavailableChannel))
        .run(&Request::Status)
        .await
        .unwrap_err();
    assert_eq!(exit_code_for(&err), EXIT_CHANNEL_UNAVAILABLE);
}

const STATUS_JSON: &str = r#"{
  "TABLE_interface": {
    "ROW_interface": [
      {"interface": "mgmt0", "state": "connected", "vlan": "routed", "duplex": "full", "speed": "1000", "type": "--"},
      {"interface": "Ethernet1/1", "name": "spine-1", "state": "connected", "vlan": "routed", "duplex": "full", "speed": "800G", "type": "OSFP-800G-DR8"},
      {"interface": "Ethernet1/2", "state": "connected", "vlan": "1", "duplex": "full", "speed": "100G", "type": "QSFP-100G-SR4"},
      {"interface": "Ethernet1/3", "state": "notconnec", "vlan": "1", "duplex": "auto", "speed": "auto", "type": "OSFP-800G-SR8"},
      {"interface": "Ethernet1/4/1", "state": "connected", "vlan": "1", "duplex": "full", "speed": "400G", "type": "OSFP-2x400G-FR4"},
      {"interface": "Ethernet1/4/2", "state": "connected", "vlan": "1", "duplex": "full", "speed": "400G", "type": "OSFP-2x400G-FR4"},
      {"interface": "Ethernet1/5", "state": "xcvrAbsent", "vlan": "1", "duplex": "auto", "speed": "auto", "type": ""}
    ]
  }
}"#;

fn status_channel() -> FakeChannel {
    FakeChannel::default()
        .respond("show interface status | json", STATUS_JSON)
        .respond(
            &sprom_cmd("Ethernet1/1"),
            &sprom("Ethernet1/1", "OSFP-800G-DR8", "8", "8", "0x0c (MPO)"),
        )
        .respond(
            &sprom_cmd("Ethernet1/2"),
            &sprom("Ethernet1/2", "QSFP-100G-SR4", "4", "4", "0x0c (MPO)"),
        )
        .fail(&sprom_cmd("Ethernet1/3"))
        .respond(
            &sprom_cmd("Ethernet1/4/1"),
            &sprom("Ethernet1/4/1", "OSFP-2x400G-FR4", "8", "8", "0x07 (LC)"),
        )
}

/// Type column of each data row, keyed by abbreviated port name.
fn type_column(table: &str) -> Vec<(String, String)> {
    table
        .lines()
        .skip(3)
        .map(|line| {
            let port = line[..15].trim().to_string();
            let ty = line[73..].trim().to_string();
            (port, ty)
        })
        .collect()
}

#[tokio::test]
async fn test_status_mixed_outcomes() {
    let channel = Arc::new(status_channel());
    let out = orchestrator(channel.clone()).status().await.unwrap();

    assert!(out.starts_with(STATUS_BANNER));
    let rows = type_column(&out);
    let expected = [
        ("mgmt0", "--"),
        ("Eth1/1", "800G-2DR4-OSFP112"),
        ("Eth1/2", "QSFP-100G-SR4"),
        ("Eth1/3", "--"),
        ("Eth1/4/1", "800G-2FR4-OSFP112"),
        ("Eth1/4/2", "800G-2FR4-OSFP112"),
        ("Eth1/5", "--"),
    ];
    assert_eq!(rows.len(), expected.len());
    for ((port, ty), (want_port, want_ty)) in rows.iter().zip(expected.iter()) {
        assert_eq!(port, want_port);
        assert_eq!(ty, want_ty, "type for {}", port);
    }
    assert!(out.contains("spine-1"));
    assert!(out.contains("xcvrAbsen "));
}

#[tokio::test]
async fn test_status_unavailable_sprom_degrades_one_row() {
    let channel = Arc::new(status_channel().unavailable(&sprom_cmd("Ethernet1/2")));
    let out = orchestrator(channel).status().await.unwrap();

    let rows = type_column(&out);
    assert_eq!(rows.len(), 7);
    assert_eq!(rows[1], ("Eth1/1".to_string(), "800G-2DR4-OSFP112".to_string()));
    assert_eq!(rows[2], ("Eth1/2".to_string(), "--".to_string()));
    assert_eq!(rows[4], ("Eth1/4/1".to_string(), "800G-2FR4-OSFP112".to_string()));
}

#[tokio::test]
async fn test_status_queries_one_sprom_per_port() {
    let channel = Arc::new(status_channel());
    orchestrator(channel.clone()).status().await.unwrap();

    let mut calls = channel.calls();
    calls.sort();
    assert_eq!(
        calls,
        vec![
            sprom_cmd("Ethernet1/1"),
            sprom_cmd("Ethernet1/2"),
            sprom_cmd("Ethernet1/3"),
            sprom_cmd("Ethernet1/4/1"),
            "show interface status | json".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_status_empty_table() {
    let channel = Arc::new(
        FakeChannel::default().respond("show interface status | json", r#"{"TABLE_interface": {"ROW_interface": []}}"#),
    );
    let out = orchestrator(channel).status().await.unwrap();
    assert_eq!(
        out,
        "No interface data found in 'show interface status | json' output."
    );
}

#[tokio::test]
async fn test_status_unparsable_is_error() {
    let channel = Arc::new(
        FakeChannel::default().respond("show interface status | json", "% Invalid command at '^' marker."),
    );
    assert!(orchestrator(channel).status().await.is_err());
}

/// Channel that records how many calls overlap.
struct SlowChannel {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    delay: Duration,
}

#[async_trait]
impl CommandChannel for SlowChannel {
    async fn run(&self, command: &str) -> Result<String, ChannelError> {
        if command == "show interface status | json" {
            let rows: Vec<String> = (1..=8)
                .map(|i| {
                    format!(
                        r#"{{"interface": "Ethernet1/{}", "state": "connected", "type": "OSFP-800G-DR8"}}"#,
                        i
                    )
                })
                .collect();
            return Ok(format!(
                r#"{{"TABLE_interface": {{"ROW_interface": [{}]}}}}"#,
                rows.join(",")
            ));
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        Ok(sprom("Ethernet1/1", "OSFP-800G-DR8", "8", "8", "0x0c (MPO)"))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_status_bounds_in_flight_queries() {
    let channel = Arc::new(SlowChannel {
        in_flight: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
        delay: Duration::from_millis(30),
    });
    let query = QueryConfig {
        max_concurrent: 2,
        timeout_secs: 5,
    };

    let out = Orchestrator::new(channel.clone(), query)
        .status()
        .await
        .unwrap();

    assert_eq!(out.matches("800G-2DR4-OSFP112").count(), 8);
    assert!(channel.peak.load(Ordering::SeqCst) <= 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_status_timeout_becomes_placeholder() {
    let channel = Arc::new(SlowChannel {
        in_flight: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
        delay: Duration::from_millis(1500),
    });
    let query = QueryConfig {
        max_concurrent: 8,
        timeout_secs: 1,
    };

    let out = Orchestrator::new(channel, query).status().await.unwrap();
    let rows = type_column(&out);
    assert_eq!(rows.len(), 8);
    assert!(rows.iter().all(|(_, ty)| ty == "--"));
}
