//! Global `tracing` subscribers.
//! `RUST_LOG` wins over the default filter in both setups.

use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Compact human readable output for local development.
pub fn init_dbg_tracing() {
    tracing_subscriber::fmt()
        .without_time()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_env_filter(env_filter("debug"))
        .compact()
        .init();
}

/// One JSON object per line, for log collectors.
pub fn init_production_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_env_filter(env_filter("info"))
        .init();
}
