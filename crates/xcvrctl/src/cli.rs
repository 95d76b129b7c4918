//! CLI - Command-line argument parsing
//!
//! `xcvrctl <interface> [details] [json]` or `xcvrctl status`. The positional
//! form mirrors how the tool is aliased on the switch (`type-check ...`).

use clap::{CommandFactory, Parser, ValueEnum};
use regex::Regex;
use std::io::Write;
use std::path::PathBuf;
use std::sync::LazyLock;
use thiserror::Error;
use xcvr_shared::OutputMode;

static INTERFACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9/._:-]*$").unwrap());

/// Transceiver type normalizer
#[derive(Parser, Debug)]
#[command(name = "xcvrctl")]
#[command(
    about = "Show transceiver SPROM and interface status with normalized 800G OSFP types",
    long_about = None
)]
#[command(version = concat!(
    env!("XCVRCTL_VERSION"), " (", env!("XCVRCTL_GIT_SHA"), " ", env!("XCVRCTL_BUILD_DATE"), ")"
))]
pub struct Cli {
    /// Enable debug output
    #[arg(short = 'D', long)]
    pub debug: bool,

    /// Config file (overrides the standard locations)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Interface name (e.g. Ethernet1/57/1), or `status` for all Ethernet ports
    pub target: String,

    /// Output options for a single interface
    #[arg(value_enum, ignore_case = true)]
    pub options: Vec<OutputOption>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputOption {
    /// Append transceiver lane details
    Details,
    /// Print JSON instead of text
    Json,
}

/// What the user asked for, after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Single { interface: String, mode: OutputMode },
    Status,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct UsageError(pub String);

impl Cli {
    pub fn request(&self) -> Result<Request, UsageError> {
        if self.target.eq_ignore_ascii_case("status") {
            if !self.options.is_empty() {
                return Err(UsageError(
                    "'status' command does not accept additional arguments".to_string(),
                ));
            }
            return Ok(Request::Status);
        }

        if !INTERFACE_RE.is_match(&self.target) {
            return Err(UsageError(format!(
                "invalid interface name '{}'",
                self.target
            )));
        }

        let details = self.count(OutputOption::Details);
        let json = self.count(OutputOption::Json);
        if details > 1 || json > 1 {
            return Err(UsageError("each option may be given only once".to_string()));
        }

        Ok(Request::Single {
            interface: self.target.clone(),
            mode: OutputMode::from_flags(json == 1, details == 1),
        })
    }

    fn count(&self, option: OutputOption) -> usize {
        self.options.iter().filter(|o| **o == option).count()
    }
}

/// Write the long help text, as printed for `xcvrctl ?`.
pub fn write_help(out: &mut impl Write) -> std::io::Result<()> {
    write!(out, "{}", Cli::command().render_help())?;
    out.flush()
}
