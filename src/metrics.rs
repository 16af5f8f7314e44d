use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub const ANALYSES_TOTAL: &str = "review_analyses_total";
pub const ANALYSIS_DURATION_MS: &str = "review_analysis_duration_ms";
pub const LAST_CLUSTERS: &str = "review_analysis_last_clusters";

// The recorder is process-global; routers built later share it.
static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder once and describe the analysis metrics.
    pub fn init() -> anyhow::Result<Self> {
        let handle = HANDLE
            .get_or_try_init(|| {
                let handle = PrometheusBuilder::new().install_recorder()?;
                describe_counter!(ANALYSES_TOTAL, "Analysis runs by outcome");
                describe_histogram!(ANALYSIS_DURATION_MS, "Wall time of one analysis run");
                describe_gauge!(LAST_CLUSTERS, "Clusters found by the latest run");
                Ok::<_, anyhow::Error>(handle)
            })?
            .clone();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// One finished run. Without an installed recorder these are no-ops.
pub fn record_success(duration_ms: f64, clusters: usize) {
    counter!(ANALYSES_TOTAL, "outcome" => "ok").increment(1);
    histogram!(ANALYSIS_DURATION_MS).record(duration_ms);
    gauge!(LAST_CLUSTERS).set(clusters as f64);
}

/// `outcome` is a short label such as "rejected" or "failed".
pub fn record_failure(outcome: &'static str, duration_ms: f64) {
    counter!(ANALYSES_TOTAL, "outcome" => outcome).increment(1);
    histogram!(ANALYSIS_DURATION_MS).record(duration_ms);
}
