//! xcvrctl library - exposes modules for the binary and integration tests

pub mod channel;
pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod logging;
pub mod orchestrator;

pub use channel::{ChannelError, CommandChannel, ShellChannel};
pub use cli::{Cli, Request};
pub use config::Config;
pub use orchestrator::Orchestrator;
