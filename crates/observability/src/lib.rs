//! Tracing and logging setup shared by every binary and test harness.

/// Initialize process-wide observability with the `info` default filter.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init("info");
}

/// Initialize with `directive` as the fallback filter (`RUST_LOG` still wins).
pub fn init_with_filter(directive: &str) {
    tracing::init(directive);
}

/// Subscriber configuration (filters, formatting).
pub mod tracing;
