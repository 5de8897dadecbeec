//! Logging setup
//!
//! Library code only emits `tracing` events. Binaries call [`init`] once to
//! install a formatting subscriber filtered by `SECRETREE_LOG`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives
pub const LOG_ENV: &str = "SECRETREE_LOG";

/// Filter used when `SECRETREE_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "secretree=info,secretree_core=info";

/// Install the global subscriber with the default filter
///
/// Returns false when a subscriber was already installed.
pub fn init() -> bool {
    init_with_default(DEFAULT_FILTER)
}

/// Install the global subscriber, falling back to `default_filter`
pub fn init_with_default(default_filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter(default_filter))
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

fn filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter))
}
