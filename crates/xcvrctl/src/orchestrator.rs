//! Query orchestration.
//!
//! Single-interface mode runs one SPROM query (plus an optional details
//! query) through extract → classify → rewrite. Status mode reads the
//! interface table, fans SPROM queries out to one representative per
//! physical port, and renders the table in the status command's own order.

use crate::channel::{ChannelError, CommandChannel};
use crate::cli::Request;
use crate::commands;
use crate::config::QueryConfig;
use anyhow::{bail, Context, Result};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};
use xcvr_shared::parsers::find_type_field;
use xcvr_shared::render::{
    append_details, render_status_table, StatusLine, NO_STATUS_DATA, PLACEHOLDER, SPROM_BANNER,
    STATUS_BANNER,
};
use xcvr_shared::{
    classify, compact_json, extract, parse_status, rewrite_json_field, rewrite_text,
    sprom_query_interface, Decision, ExtractError, OutputMode, StatusRow,
};

/// Result of one SPROM query in status mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpromOutcome {
    /// Fields were read and classified
    Classified(Decision),
    /// Output came back but lacks the fields the rules need
    Unclassified(ExtractError),
    /// Query failed, timed out, or there is no transceiver
    Failed(String),
}

impl SpromOutcome {
    pub fn from_output(raw: &str) -> Self {
        match extract(raw) {
            Ok(record) => Self::Classified(classify(&record)),
            Err(e) if e.is_absent() => Self::Failed(e.to_string()),
            Err(e) => Self::Unclassified(e),
        }
    }
}

/// Type column for one status row, given the SPROM outcomes by interface.
pub fn display_type(row: &StatusRow, outcomes: &HashMap<String, SpromOutcome>) -> String {
    if !row.needs_sprom() {
        return if row.is_xcvr_absent() {
            PLACEHOLDER.to_string()
        } else {
            row.xcvr_type.clone()
        };
    }

    match outcomes.get(&sprom_query_interface(&row.interface)) {
        Some(SpromOutcome::Classified(decision)) => decision.final_type.clone(),
        Some(SpromOutcome::Unclassified(_)) => row.xcvr_type.clone(),
        Some(SpromOutcome::Failed(_)) | None => PLACEHOLDER.to_string(),
    }
}

pub struct Orchestrator {
    channel: Arc<dyn CommandChannel>,
    query: QueryConfig,
}

impl Orchestrator {
    pub fn new(channel: Arc<dyn CommandChannel>, query: QueryConfig) -> Self {
        Self { channel, query }
    }

    /// Execute a request and return the text to print.
    pub async fn run(&self, request: &Request) -> Result<String> {
        match request {
            Request::Single { interface, mode } => self.single(interface, *mode).await,
            Request::Status => self.status().await,
        }
    }

    pub async fn single(&self, interface: &str, mode: OutputMode) -> Result<String> {
        let raw = self
            .query(commands::sprom(interface))
            .await
            .with_context(|| format!("Could not retrieve SPROM data for {}", interface))?;

        let decision = match extract(&raw) {
            Ok(record) => {
                let decision = classify(&record);
                log_decision(interface, &decision);
                Some(decision)
            }
            Err(e) if e.is_absent() => bail!(
                "Could not retrieve SPROM data for {} or transceiver not present",
                interface
            ),
            Err(e) => {
                warn!("{}: {}; leaving SPROM output unchanged", interface, e);
                None
            }
        };

        match mode {
            OutputMode::Text | OutputMode::TextWithDetails => {
                let mut text = match &decision {
                    Some(decision) => rewrite_text(&raw, decision),
                    None => raw,
                };
                if mode == OutputMode::TextWithDetails {
                    let details = self.query(commands::details_text(interface)).await;
                    if let Err(e) = &details {
                        warn!("Details query for {} failed: {}", interface, e);
                    }
                    let details = details.map_err(|e| e.to_string());
                    text = append_details(text, details.as_deref().map_err(String::as_str));
                }
                Ok(format!("{}\n{}", SPROM_BANNER, text))
            }
            OutputMode::CompactJson => {
                let decision = match decision {
                    Some(decision) => decision,
                    None => match find_type_field(&raw) {
                        Some(field) => Decision::unchanged(field.value),
                        None => bail!("SPROM output for {} has no type field", interface),
                    },
                };
                Ok(compact_json(&decision))
            }
            OutputMode::DetailsJson => {
                let details = self
                    .query(commands::details_json(interface))
                    .await
                    .with_context(|| {
                        format!("Could not retrieve transceiver details for {}", interface)
                    })?;
                match decision {
                    Some(decision) => rewrite_json_field(&details, "type", &decision)
                        .with_context(|| {
                            format!("Could not rewrite transceiver details for {}", interface)
                        }),
                    None => Ok(details),
                }
            }
        }
    }

    pub async fn status(&self) -> Result<String> {
        let raw = self
            .query(commands::STATUS.to_string())
            .await
            .with_context(|| format!("Failed to run '{}'", commands::STATUS))?;
        let rows = parse_status(&raw)
            .with_context(|| format!("Failed to parse '{}' output", commands::STATUS))?;

        if rows.is_empty() {
            return Ok(NO_STATUS_DATA.to_string());
        }

        let targets: BTreeSet<String> = rows
            .iter()
            .filter(|row| row.needs_sprom())
            .map(|row| sprom_query_interface(&row.interface))
            .collect();
        debug!("SPROM query interfaces: {:?}", targets);

        let outcomes = self.collect_sprom(targets).await;

        let lines: Vec<StatusLine> = rows
            .into_iter()
            .map(|row| {
                let display_type = display_type(&row, &outcomes);
                StatusLine { row, display_type }
            })
            .collect();

        Ok(format!("{}\n{}", STATUS_BANNER, render_status_table(&lines)))
    }

    /// Query every interface's SPROM with bounded concurrency. Results are
    /// keyed by interface, so completion order does not matter.
    async fn collect_sprom(&self, interfaces: BTreeSet<String>) -> HashMap<String, SpromOutcome> {
        let started = Instant::now();
        let total = interfaces.len();
        let semaphore = Arc::new(Semaphore::new(self.query.concurrency()));
        let mut join_set = JoinSet::new();

        info!(
            "Collecting SPROM data for {} interfaces, max {} in flight",
            total,
            self.query.concurrency()
        );

        for interface in interfaces {
            let channel = Arc::clone(&self.channel);
            let semaphore = Arc::clone(&semaphore);
            let timeout_secs = self.query.timeout_secs;

            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let outcome =
                    match run_query(channel, commands::sprom(&interface), timeout_secs).await {
                        Ok(raw) => SpromOutcome::from_output(&raw),
                        Err(e) => SpromOutcome::Failed(e.to_string()),
                    };
                (interface, outcome)
            });
        }

        let mut outcomes = HashMap::with_capacity(total);
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((interface, outcome)) => {
                    match &outcome {
                        SpromOutcome::Classified(decision) => log_decision(&interface, decision),
                        SpromOutcome::Unclassified(e) => {
                            warn!("{}: {}; keeping reported type", interface, e)
                        }
                        SpromOutcome::Failed(reason) => warn!("{}: {}", interface, reason),
                    }
                    outcomes.insert(interface, outcome);
                }
                Err(e) => warn!("SPROM task did not complete: {}", e),
            }
        }

        let failed = outcomes
            .values()
            .filter(|o| matches!(o, SpromOutcome::Failed(_)))
            .count();
        info!(
            "SPROM collection complete - queried={}, failed={}, elapsed={:.4}s",
            total,
            failed + (total - outcomes.len()),
            started.elapsed().as_secs_f64()
        );

        outcomes
    }

    async fn query(&self, command: String) -> Result<String, ChannelError> {
        run_query(Arc::clone(&self.channel), command, self.query.timeout_secs).await
    }
}

/// Run one channel call bounded by a timeout. On timeout the call's future
/// is dropped, which cancels the device command.
async fn run_query(
    channel: Arc<dyn CommandChannel>,
    command: String,
    timeout_secs: u64,
) -> Result<String, ChannelError> {
    let started = Instant::now();
    debug!("Calling '{}'", command);

    let result = match timeout(Duration::from_secs(timeout_secs), channel.run(&command)).await {
        Ok(result) => result,
        Err(_) => Err(ChannelError::Timeout {
            command: command.clone(),
            secs: timeout_secs,
        }),
    };

    debug!(
        "'{}' finished in {:.4}s",
        command,
        started.elapsed().as_secs_f64()
    );
    result
}

fn log_decision(interface: &str, decision: &Decision) {
    if decision.is_modified() {
        debug!(
            "{}: type '{}' -> '{}' (rule {})",
            interface,
            decision.original_type,
            decision.final_type,
            decision.rule.unwrap_or("-")
        );
    } else {
        debug!("{}: no rule matched, type stays '{}'", interface, decision.original_type);
    }
}
