//! Logging utilities
//!
//! The engine logs through the `log` facade; applications pick the backend.
//! These helpers wire up `env_logger` for binaries and tests.

pub use log::{debug, error, info, trace, warn};

/// Initialize logging from the `RUST_LOG` environment variable
pub fn init() {
    env_logger::init();
}

/// Initialize logging with an explicit filter such as `"sprite_engine=debug"`
///
/// `RUST_LOG` still takes precedence when it is set.
pub fn init_with_filter(filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}

/// Initialize test-friendly logging; safe to call from every test
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
