//! xcvrctl - transceiver type normalizer for the switch CLI
//!
//! Prints SPROM and interface status output with legacy 800G OSFP type
//! strings replaced by their current names.

use anyhow::Result;
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use xcvrctl::{cli, errors, logging, Cli, Config, Orchestrator, ShellChannel};

#[tokio::main]
async fn main() {
    // `?` is the on-box help convention
    if std::env::args().nth(1).as_deref() == Some("?") {
        if let Err(e) = cli::write_help(&mut std::io::stdout().lock()) {
            eprintln!("Error: {}", e);
            std::process::exit(errors::EXIT_GENERAL_ERROR);
        }
        return;
    }

    let cli = Cli::parse();
    logging::init(cli.debug);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(errors::exit_code_for(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let request = cli.request()?;
    let config = Config::load(cli.config.as_deref())?;

    let channel = Arc::new(ShellChannel::from_config(&config.channel));
    let orchestrator = Orchestrator::new(channel, config.query);
    let output = orchestrator.run(&request).await?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
