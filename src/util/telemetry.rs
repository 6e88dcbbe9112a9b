//! Telemetry helpers for structured logging and tracing.

use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "resource_queue=info";

/// Install a `tracing-subscriber` fmt subscriber driven by `RUST_LOG`.
///
/// Falls back to [`DEFAULT_LOG_FILTER`]. Does nothing if the application
/// already installed its own subscriber, so it is safe to call from every test.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
