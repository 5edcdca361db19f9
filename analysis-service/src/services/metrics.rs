//! Metrics collection and Prometheus export.
//!
//! Installs the global recorder used by the `metrics` macros and renders it
//! for the /metrics endpoint.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the metrics recorder.
///
/// Call once at startup before any metrics are recorded; later calls are no-ops.
pub fn init_metrics() -> Result<(), BuildError> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

/// Get the current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

/// Record one provider call: outcome counter plus latency.
pub fn record_provider_call(provider: &'static str, outcome: &'static str, elapsed: Duration) {
    counter!("analysis_requests_total", "provider" => provider, "outcome" => outcome).increment(1);
    histogram!("analysis_provider_latency_seconds", "provider" => provider)
        .record(elapsed.as_secs_f64());
}
