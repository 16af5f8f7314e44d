// src/lib.rs
// Public library surface: the analysis pipeline and the HTTP router around it.

pub mod aggregate;
pub mod api;
pub mod cluster;
pub mod config;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod project;
pub mod review;
pub mod sentiment;
pub mod vectorize;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::config::AnalysisConfig;
pub use crate::error::AnalyzeError;
pub use crate::pipeline::{analyze, analyze_with, AnalysisResult};
pub use crate::review::{AnalyzeRequest, Review};
pub use crate::sentiment::Sentiment;

use shuttle_axum::axum::Router;
use tracing::info;

/// Build the full application router: config from disk/env, Prometheus
/// recorder, and all routes. Used by the binary and by integration tests.
pub fn app() -> anyhow::Result<Router> {
    let config = AnalysisConfig::load()?;
    info!(
        default_eps = config.default_eps,
        default_min_samples = config.default_min_samples,
        max_features = config.max_features,
        "analysis config loaded"
    );
    let metrics = crate::metrics::Metrics::init()?;
    Ok(create_router(AppState::new(config).with_metrics(metrics)))
}
