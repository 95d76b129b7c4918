//! Logging setup.
//!
//! Logs go to stderr so stdout stays parseable in JSON mode.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `-D` forces debug level; otherwise
/// `RUST_LOG` applies, defaulting to info.
pub fn init(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
