//! Logging initialization and configuration.
//!
//! Uses the `tracing` ecosystem with human-readable or JSON output.
//! Everything goes to stderr; stdout carries only the JSON summary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem.
///
/// # Arguments
///
/// * `level` - Default level when `RUST_LOG` is not set.
/// * `json_format` - If true, outputs structured JSON logs; otherwise pretty-printed.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging with settings from the config, with CLI overrides.
pub fn init_from_config(
    config: &autotag_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    init(
        effective_level(&config.logging.level, verbose_override),
        json_logs_override || config.logging.format == "json",
    );
}

/// `--verbose` raises the level to debug but never lowers a configured trace.
fn effective_level(configured: &str, verbose: bool) -> &str {
    if verbose && configured != "trace" {
        "debug"
    } else {
        configured
    }
}
