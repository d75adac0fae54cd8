//! Tracing setup.
//!
//! Logs go to stderr so the binary's stdout stays pure JSON. `RUST_LOG`
//! overrides the configured level when set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;

/// HTTP client internals, pinned to `warn`.
pub const NOISY_MODULES: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls"];

fn build_filter(log_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let mut directives = String::from(log_level);
    for module in NOISY_MODULES {
        directives.push_str(&format!(",{}=warn", module));
    }

    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Returns `false` if one was already set.
pub fn init_tracing(log_level: &str, log_format: LogFormat) -> bool {
    let subscriber = tracing_subscriber::registry().with(build_filter(log_level));

    let installed = match log_format {
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true)
                .with_writer(std::io::stderr);
            subscriber.with(fmt_layer).try_init().is_ok()
        }
        LogFormat::Pretty => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            subscriber.with(fmt_layer).try_init().is_ok()
        }
    };

    if installed {
        tracing::debug!(log_level = %log_level, log_format = ?log_format, "Tracing initialized");
    }
    installed
}
