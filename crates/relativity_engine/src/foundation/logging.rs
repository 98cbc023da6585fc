//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system with the default `info` filter
pub fn init() {
    init_with_level("info");
}

/// Initialize the logging system with a fallback filter
///
/// `RUST_LOG` takes precedence when it is set; otherwise `level` (for example
/// `"debug"` or `"relativity_engine=trace"`) is used. Calling this twice is
/// harmless, the second call is ignored.
pub fn init_with_level(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized, keeping existing configuration");
    }
}
