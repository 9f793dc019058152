//! Logging infrastructure for RepLog.
//!
//! Provides centralized tracing setup for the `replog` binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when RUST_LOG is unset
const DEFAULT_FILTER: &str = "info,tower_http=warn";

/// Filter used when RUST_LOG is unset and `--verbose` was given
const VERBOSE_FILTER: &str = "debug,replog_core=trace";

/// Install the global subscriber, writing to stderr
///
/// RUST_LOG always wins over the built-in filters. Stdout is left free for
/// command output such as CSV exports.
pub fn init(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Initialize logging for tests; safe to call more than once
#[doc(hidden)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
