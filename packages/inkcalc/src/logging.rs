use tracing_subscriber::EnvFilter;

use crate::config::default_log_filter;

/// Installs the global subscriber. Output goes to stderr; stdout carries JSON.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
