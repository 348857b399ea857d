//! Process-global observability runtime settings.

use std::sync::{
    OnceLock,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use crate::config::ServerConfig;

static SLOW_REQUEST_THRESHOLD_MS: AtomicU64 = AtomicU64::new(2_000);
static OTEL_PARENT_PROPAGATION_ENABLED: AtomicBool = AtomicBool::new(false);
static QUIET_PATHS: OnceLock<Vec<String>> = OnceLock::new();

pub(super) fn apply_runtime_config(config: &ServerConfig) {
    let observability = &config.observability;

    SLOW_REQUEST_THRESHOLD_MS.store(observability.slow_request_threshold_ms, Ordering::Relaxed);
    OTEL_PARENT_PROPAGATION_ENABLED.store(
        observability.otel_enabled && observability.otel_parent_propagation_enabled,
        Ordering::Relaxed,
    );

    _ = QUIET_PATHS.set(
        config
            .logging
            .log_quiet_paths
            .iter()
            .map(|path| path.trim().trim_end_matches('/').to_string())
            .filter(|path| !path.is_empty())
            .collect(),
    );
}

pub(super) fn slow_request_threshold_ms() -> u64 {
    SLOW_REQUEST_THRESHOLD_MS.load(Ordering::Relaxed)
}

pub(super) fn otel_parent_propagation_enabled() -> bool {
    OTEL_PARENT_PROPAGATION_ENABLED.load(Ordering::Relaxed)
}

/// Health probes and scrapes are not logged. Before configuration is applied
/// the defaults hold.
pub(super) fn is_quiet_path(path: &str) -> bool {
    match QUIET_PATHS.get() {
        Some(paths) => paths.iter().any(|quiet| quiet == path),
        None => matches!(path, "/healthcheck" | "/metrics"),
    }
}
