//! Structured logging initialization via `tracing`.

use tracing_subscriber::EnvFilter;

fn filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Initialize the tracing subscriber for interactive use.
///
/// `RUST_LOG` wins when set; otherwise `default_directive` applies
/// (e.g. `"aegis_shield=info"`).
pub fn init_tracing(default_directive: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(default_directive))
        .init();
}

/// JSON-formatted variant for log-aggregating hosts.
pub fn init_tracing_json(default_directive: &str) {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter(default_directive))
        .init();
}
