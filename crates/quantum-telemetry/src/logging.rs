//! Structured logging initialization.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global `tracing` subscriber. Honors `RUST_LOG`, defaulting
/// to `info`. Safe to call once at process start; a second call is a no-op
/// (the error from `tracing`'s global-default guard is swallowed).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}
