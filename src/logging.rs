//! Structured logging setup.
//!
//! Verbose mode turns on the `[LOG]`-prefixed request diagnostics the
//! dispatcher emits (`[LOG] From: <uid> Request: <kind> Result: <status>`,
//! `[LOG] Request received from: <addr> (UDP|TCP)`); those lines are logged
//! directly by the call sites at `info` level, gated by this filter — the
//! non-verbose default sits at `warn` so they stay quiet until `-v`.

use tracing_subscriber::EnvFilter;

/// Initializes the global `tracing` subscriber.
///
/// `verbose` selects `info` level (surfacing the `[LOG]` diagnostics);
/// otherwise only `warn` and above are emitted.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();
}
