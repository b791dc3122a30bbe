//! Tracing subscriber setup

use crate::config::LoggingConfig;
use std::env;
use std::io;
use tracing_subscriber::{
    EnvFilter, fmt, layer::SubscriberExt, registry::Registry, util::SubscriberInitExt,
};

/// Build the env filter: `RUST_LOG` wins over the configured level, and
/// HTTP client internals are always held at `warn`.
fn build_filter(level: &str) -> EnvFilter {
    env::var("RUST_LOG")
        .map_or_else(|_| EnvFilter::new(level), |directive| EnvFilter::new(&directive))
        .add_directive(
            "hyper=warn"
                .parse()
                .unwrap_or_else(|_| tracing::Level::WARN.into()),
        )
        .add_directive(
            "reqwest=warn"
                .parse()
                .unwrap_or_else(|_| tracing::Level::WARN.into()),
        )
        .add_directive(
            "reqwest_retry=warn"
                .parse()
                .unwrap_or_else(|_| tracing::Level::WARN.into()),
        )
}

/// Install the global subscriber. `verbose` forces `debug` for this crate.
///
/// Logs go to stderr so the run summary on stdout stays machine readable.
/// Calling this twice is harmless; the second install is ignored.
pub fn init(config: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let filter = build_filter(level).add_directive(
        format!("mountain_forecast={level}")
            .parse()
            .unwrap_or_else(|_| tracing::Level::INFO.into()),
    );

    let registry = Registry::default().with(filter);

    let result = if config.format == "json" {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(io::stderr))
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("logging already initialised: {e}");
    }
}
