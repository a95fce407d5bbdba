//! Logging setup.
//!
//! Logs go to stderr through `tracing_subscriber::fmt`, leaving stdout for
//! summaries and `--json` output. `RUST_LOG` takes precedence over the
//! verbosity flag.

use tracing_subscriber::EnvFilter;

/// Default filter directive for a `-v` count
pub fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

pub fn env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level(verbosity)))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(verbosity: u8) {
    // Fails only when a subscriber is already installed, e.g. across tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
