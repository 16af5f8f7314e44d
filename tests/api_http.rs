// tests/api_http.rs
//
// HTTP-level tests for the public Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /, GET /health
// - POST /analyze (success, config defaults, too few reviews, bad params, malformed body)
// - POST /analyze/products (catalog flattening + config defaults)

use serde_json::json;
use serde_json::Value as Json;
use http::{Request, StatusCode};
use shuttle_axum::axum::{
    body::{self, Body},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use review_cluster_analyzer::{create_router, AnalysisConfig, AppState};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

fn test_router() -> Router {
    create_router(AppState::new(AnalysisConfig::default()))
}

fn review(product: &str, comment: &str) -> Json {
    json!({ "product": product, "reviewer": "tester", "rating": 4, "comment": comment })
}

async fn post_json(app: Router, uri: &str, payload: Json) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let v = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

#[tokio::test]
async fn health_returns_ok() {
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = test_router().oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    assert_eq!(String::from_utf8(bytes).expect("utf8").trim(), "ok");
}

#[tokio::test]
async fn root_reports_running() {
    let req = Request::builder()
        .uri("/")
        .body(Body::empty())
        .expect("build GET /");
    let resp = test_router().oneshot(req).await.expect("oneshot /");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v: Json = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(v["status"], "running");
    assert_eq!(v["message"], "Customer Review Clustering API");
}

#[tokio::test]
async fn analyze_returns_full_payload() {
    let payload = json!({
        "reviews": [
            review("Blender", "Great product, loved it!"),
            review("Blender", "Terrible, broke immediately"),
            review("Toaster", "Loved it, great quality"),
        ],
        "eps": 0.5,
        "min_samples": 2
    });
    let (status, v) = post_json(test_router(), "/analyze", payload).await;
    assert_eq!(status, StatusCode::OK, "body: {v}");

    assert_eq!(v["clusters"], json!([0, -1, 0]));
    assert_eq!(v["metrics"]["num_clusters"], 1);
    assert_eq!(v["metrics"]["noise_points"], 1);
    assert_eq!(v["metrics"]["total_reviews"], 3);
    assert_eq!(v["sentiment_summary"]["positive"], 66.7);
    assert_eq!(v["sentiment_summary"]["negative"], 33.3);

    let sentiments = v["sentiments"].as_array().expect("sentiments array");
    assert_eq!(sentiments.len(), 3);
    assert_eq!(sentiments[1]["label"], "negative");
    assert_eq!(sentiments[1]["index"], 1);
    assert!(sentiments[0]["scores"]["compound"].is_number());

    let summary = v["cluster_summary"].as_array().expect("cluster_summary");
    assert_eq!(summary[0]["cluster"], -1);
    assert_eq!(summary[1]["cluster"], 0);
    assert_eq!(summary[1]["avg_sentiment"], "positive");
    assert_eq!(summary[1]["sentiment_distribution"]["positive"], 2);

    let points = v["visual_data"]["pca"].as_array().expect("pca points");
    assert_eq!(points.len(), 3);
    assert_eq!(points[2]["product"], "Toaster");
    assert_eq!(points[2]["index"], 2);
    assert_eq!(points[0]["comment"], "Great product, loved it!...");
}

#[tokio::test]
async fn analyze_defaults_eps_and_min_samples() {
    let payload = json!({
        "reviews": [review("A", "great blender"), review("B", "great blender")]
    });
    let (status, v) = post_json(test_router(), "/analyze", payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["clusters"], json!([0, 0]));
    for p in v["visual_data"]["pca"].as_array().expect("pca") {
        assert_eq!(p["x"], 0.0);
        assert_eq!(p["y"], 0.0);
    }
}

#[tokio::test]
async fn analyze_falls_back_to_configured_knobs() {
    let config = AnalysisConfig {
        default_min_samples: 3,
        ..AnalysisConfig::default()
    };
    let app = create_router(AppState::new(config));
    let reviews = [review("A", "great blender"), review("B", "great blender")];

    let (status, v) = post_json(app.clone(), "/analyze", json!({ "reviews": reviews })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["clusters"], json!([-1, -1]));

    // An explicit knob still wins over the config.
    let payload = json!({ "reviews": reviews, "min_samples": 2 });
    let (status, v) = post_json(app, "/analyze", payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["clusters"], json!([0, 0]));
}

#[tokio::test]
async fn single_review_is_a_bad_request() {
    let payload = json!({ "reviews": [review("A", "Great")] });
    let (status, v) = post_json(test_router(), "/analyze", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        v["detail"]
            .as_str()
            .is_some_and(|d| d.contains("at least 2 reviews")),
        "detail: {v}"
    );
}

#[tokio::test]
async fn invalid_eps_is_a_bad_request() {
    let payload = json!({
        "reviews": [review("A", "good"), review("B", "bad")],
        "eps": -0.1
    });
    let (status, v) = post_json(test_router(), "/analyze", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(v["detail"].as_str().is_some_and(|d| d.contains("eps")));
}

#[tokio::test]
async fn malformed_body_is_rejected_by_extractor() {
    let (status, _) = post_json(test_router(), "/analyze", json!({ "reviews": "nope" })).await;
    assert!(status.is_client_error(), "got {status}");
}

#[tokio::test]
async fn products_endpoint_flattens_catalog() {
    let payload = json!({
        "products": [
            { "id": 1, "title": "Mascara", "reviews": [
                { "rating": 5, "comment": "Great mascara, loved it", "reviewerName": "Ann" },
                { "rating": 5, "comment": "Loved this mascara", "reviewerName": "Bo" }
            ]},
            { "id": 2, "title": "Kettle", "reviews": [
                { "rating": 1, "comment": "Kettle leaks water everywhere", "reviewerName": "Cy" }
            ]}
        ]
    });
    let (status, v) = post_json(test_router(), "/analyze/products", payload).await;
    assert_eq!(status, StatusCode::OK, "body: {v}");
    assert_eq!(v["metrics"]["total_reviews"], 3);

    let points = v["visual_data"]["pca"].as_array().expect("pca");
    assert_eq!(points[0]["product"], "Mascara");
    assert_eq!(points[2]["product"], "Kettle");
    // the two mascara reviews share "mascara" and "loved"
    assert_eq!(v["clusters"][0], v["clusters"][1]);
    assert_eq!(v["clusters"][2], -1);
}

#[tokio::test]
async fn products_endpoint_with_too_few_reviews() {
    let payload = json!({ "products": [ { "title": "Lonely" } ] });
    let (status, v) = post_json(test_router(), "/analyze/products", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(v["detail"].as_str().is_some_and(|d| d.contains("got 0")));
}
