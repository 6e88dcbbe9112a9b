/// Wall-clock timestamps.
pub mod clock;
/// Tracing subscriber setup.
pub mod telemetry;

pub use clock::now_ms;
pub use telemetry::{init_tracing, DEFAULT_LOG_FILTER};
