//! Diagnostic logging.
//!
//! All diagnostics go to stderr: stdout carries command output and, for the
//! hook, the JSON decision the host reads. Verbosity comes from
//! `TASKGATE_LOG` (an `EnvFilter` directive such as `taskgate=debug`).

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the filter directive.
pub const LOG_ENV: &str = "TASKGATE_LOG";

const DEFAULT_FILTER: &str = "taskgate=warn";

/// Install the global subscriber. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| DEFAULT_FILTER.into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
