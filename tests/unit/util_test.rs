//! Tests for utility functions

use resource_queue::util::{init_tracing, now_ms, DEFAULT_LOG_FILTER};

#[test]
fn test_now_ms_after_2020() {
    // 2020-01-01T00:00:00Z
    assert!(now_ms() > 1_577_836_800_000);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    tracing::info!("tracing initialized twice without panicking");
}

#[test]
fn test_default_filter_targets_crate() {
    assert!(DEFAULT_LOG_FILTER.starts_with("resource_queue"));
}
