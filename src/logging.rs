//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout only carries the report. `RUST_LOG` overrides
//! the default filter.

use tracing_subscriber::{EnvFilter, fmt};

/// Default filter for the report/charts commands.
pub const DEFAULT_FILTER: &str = "covid_insights=info";

/// Default filter while the TUI owns the terminal.
pub const QUIET_FILTER: &str = "covid_insights=warn";

/// Install the global subscriber. Safe to call more than once; later calls are no-ops.
pub fn init_logging(default_filter: &str) {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
