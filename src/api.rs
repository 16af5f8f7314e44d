use std::sync::Arc;

use serde_json::{json, Value};
use shuttle_axum::axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::config::AnalysisConfig;
use crate::error::AnalyzeError;
use crate::metrics::Metrics;
use crate::pipeline::{self, AnalysisResult};
use crate::review::{reviews_from_products, AnalyzeBody, AnalyzeRequest, ProductsRequest};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AnalysisConfig>,
    /// When present, `/metrics` is mounted.
    pub metrics: Option<Metrics>,
}

impl AppState {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config: Arc::new(config),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

pub fn create_router(state: AppState) -> Router {
    let metrics = state.metrics.clone();

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", post(analyze))
        .route("/analyze/products", post(analyze_products))
        .with_state(state);

    let app = match metrics {
        Some(m) => app.merge(m.router()),
        None => app,
    };
    app.layer(CorsLayer::very_permissive())
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Customer Review Clustering API",
        "status": "running"
    }))
}

/// Runs the CPU-bound pipeline off the async workers.
async fn run_blocking(
    request: AnalyzeRequest,
    config: Arc<AnalysisConfig>,
) -> Result<AnalysisResult, AnalyzeError> {
    tokio::task::spawn_blocking(move || pipeline::analyze_with(&request, &config))
        .await
        .map_err(|e| AnalyzeError::computation(format!("analysis task aborted: {e}")))?
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeBody>,
) -> Result<Json<AnalysisResult>, AnalyzeError> {
    let request = body.into_request(state.config.default_eps, state.config.default_min_samples);
    run_blocking(request, state.config.clone()).await.map(Json)
}

async fn analyze_products(
    State(state): State<AppState>,
    Json(body): Json<ProductsRequest>,
) -> Result<Json<AnalysisResult>, AnalyzeError> {
    let request = AnalyzeRequest {
        reviews: reviews_from_products(&body.products),
        eps: body.eps.unwrap_or(state.config.default_eps),
        min_samples: body.min_samples.unwrap_or(state.config.default_min_samples),
    };
    tracing::debug!(
        products = body.products.len(),
        reviews = request.reviews.len(),
        "flattened catalog"
    );
    run_blocking(request, state.config.clone()).await.map(Json)
}
