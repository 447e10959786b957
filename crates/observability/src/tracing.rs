//! Tracing/logging initialization.
//!
//! JSON lines with timestamps, filtered by `RUST_LOG` when set and by the
//! caller's directive otherwise.

use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` first, then `fallback`, then `info`.
pub fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(fallback: &str) {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter(fallback))
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        ::tracing::debug!(fallback, "tracing initialised");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_directive_is_used_without_rust_log() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert_eq!(env_filter("warn").to_string(), "warn");
    }

    #[test]
    fn init_is_idempotent() {
        init("warn");
        init("debug");
    }
}
