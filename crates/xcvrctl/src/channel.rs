//! Device command channel.
//!
//! Every query goes through [`CommandChannel::run`]. On the switch that is
//! `vsh -c "<command>"`; tests swap in an in-memory channel.

use crate::config::ChannelConfig;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("command channel '{program}' is unavailable: {reason}")]
    Unavailable { program: String, reason: String },

    #[error("'{command}' failed (exit {code:?}): {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("'{command}' timed out after {secs}s")]
    Timeout { command: String, secs: u64 },
}

impl ChannelError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ChannelError::Unavailable { .. })
    }
}

/// Runs one read-only device command and returns its output.
///
/// Dropping the returned future must cancel the command; callers bound it
/// with a timeout.
#[async_trait]
pub trait CommandChannel: Send + Sync {
    async fn run(&self, command: &str) -> Result<String, ChannelError>;
}

/// Channel that hands each command to a local program as its last argument.
/// The child is killed if the query is dropped before it exits.
#[derive(Debug, Clone)]
pub struct ShellChannel {
    program: String,
    args: Vec<String>,
}

impl ShellChannel {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &ChannelConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }
}

#[async_trait]
impl CommandChannel for ShellChannel {
    async fn run(&self, command: &str) -> Result<String, ChannelError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ChannelError::Unavailable {
                program: self.program.clone(),
                reason: match e.kind() {
                    ErrorKind::NotFound => "program not found".to_string(),
                    ErrorKind::PermissionDenied => "permission denied".to_string(),
                    _ => e.to_string(),
                },
            })?;

        if !output.status.success() {
            return Err(ChannelError::CommandFailed {
                command: command.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
