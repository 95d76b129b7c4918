//! Exit codes for xcvrctl

use crate::channel::ChannelError;
use crate::cli::UsageError;

/// Exit code for general errors
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code for invalid arguments
pub const EXIT_USAGE: i32 = 64;

/// Exit code when the device command channel cannot be reached
pub const EXIT_CHANNEL_UNAVAILABLE: i32 = 69;

/// Pick the exit code for a failed run from anywhere in its error chain.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.chain().any(|e| e.downcast_ref::<UsageError>().is_some()) {
        return EXIT_USAGE;
    }
    if err
        .chain()
        .filter_map(|e| e.downcast_ref::<ChannelError>())
        .any(ChannelError::is_unavailable)
    {
        return EXIT_CHANNEL_UNAVAILABLE;
    }
    EXIT_GENERAL_ERROR
}
