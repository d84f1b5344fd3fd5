//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system
///
/// Uses `RUST_LOG` when set and falls back to `info` otherwise.
pub fn init() {
    init_with_level("info");
}

/// Initialize the logging system with a default filter
///
/// `default_filter` uses `env_logger` filter syntax (`"debug"`,
/// `"forge_gfx=trace,warn"`) and is overridden by `RUST_LOG`. Calling this
/// more than once keeps the first logger.
pub fn init_with_level(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}
