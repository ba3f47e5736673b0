//! Logging setup helpers built on `tracing-subscriber`.

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber with an `info` default level.
///
/// The `RUST_LOG` environment variable, when set, takes precedence over the
/// default. Calling this more than once is harmless; subsequent calls are
/// no-ops.
pub fn setup_logger() {
    setup_logger_with_level("info");
}

/// Initializes the global tracing subscriber with the given default level.
///
/// `level` accepts any `tracing` filter directive, e.g. `"debug"` or
/// `"sonas_rs=trace"`. The `RUST_LOG` environment variable, when set, takes
/// precedence.
pub fn setup_logger_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
