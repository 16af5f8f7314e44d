//! Review Cluster Analyzer — Binary Entrypoint
//! Boots the Axum HTTP server on the Shuttle runtime.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - REVIEW_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("REVIEW_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("review_cluster_analyzer=info,cluster=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    // Picks up ANALYSIS_CONFIG_PATH / ANALYSIS_DEFAULT_* overrides.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let router = review_cluster_analyzer::app()?;
    Ok(router.into())
}
