// tests/metrics.rs
//
// The full app (config + Prometheus recorder) exposes run counters on /metrics.

use serde_json::json;
use http::{Request, StatusCode};
use shuttle_axum::axum::{
    body::{self, Body},
    Router,
};
use tower::ServiceExt;

const BODY_LIMIT: usize = 1024 * 1024;

fn build_app() -> Router {
    review_cluster_analyzer::app().expect("app() should build Router in tests")
}

async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).expect("build GET");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

async fn post_analyze(app: Router, payload: serde_json::Value) -> StatusCode {
    let req = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST");
    app.oneshot(req).await.expect("oneshot").status()
}

#[tokio::test]
async fn metrics_endpoint_contains_run_series() {
    let app = build_app();

    let ok = json!({ "reviews": [
        { "product": "A", "reviewer": "x", "rating": 5, "comment": "great blender" },
        { "product": "A", "reviewer": "y", "rating": 5, "comment": "great blender indeed" }
    ]});
    assert_eq!(post_analyze(app.clone(), ok).await, StatusCode::OK);

    let rejected = json!({ "reviews": [
        { "product": "A", "reviewer": "x", "rating": 5, "comment": "alone" }
    ]});
    assert_eq!(post_analyze(app.clone(), rejected).await, StatusCode::BAD_REQUEST);

    let (status, text) = get_text(app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("review_analyses_total"), "metrics:\n{text}");
    assert!(text.contains("outcome=\"ok\""), "metrics:\n{text}");
    assert!(text.contains("outcome=\"rejected\""), "metrics:\n{text}");
    assert!(text.contains("review_analysis_last_clusters"), "metrics:\n{text}");
}

#[tokio::test]
async fn building_the_app_twice_is_fine() {
    let _a = build_app();
    let (status, _) = get_text(build_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
}
