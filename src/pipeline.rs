//! # Review analysis pipeline
//! normalize → TF-IDF → DBSCAN (cosine) → sentiment → aggregation → PCA.
//!
//! Every stage is request-scoped. Index `i` in each per-review collection of
//! the result refers to `request.reviews[i]`.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, info_span, warn};

use crate::aggregate::{aggregate, ClusterSummary, Metrics, SentimentSummary};
use crate::cluster::Dbscan;
use crate::config::AnalysisConfig;
use crate::error::{AnalyzeError, Result};
use crate::normalize::normalize;
use crate::project::project;
use crate::review::AnalyzeRequest;
use crate::sentiment::{Sentiment, SentimentAnalyzer, SentimentResult};
use crate::vectorize::TfidfVectorizer;

/// One review placed in the 2-D plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualPoint {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub cluster: i32,
    pub sentiment: Sentiment,
    pub product: String,
    /// Truncated comment followed by "...".
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualData {
    pub pca: Vec<VisualPoint>,
}

/// Response body of an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub clusters: Vec<i32>,
    pub sentiments: Vec<SentimentResult>,
    pub metrics: Metrics,
    pub sentiment_summary: SentimentSummary,
    pub cluster_summary: Vec<ClusterSummary>,
    pub visual_data: VisualData,
}

/// First `chars` characters of `comment` plus an ellipsis (always appended).
pub fn preview(comment: &str, chars: usize) -> String {
    let mut s: String = comment.chars().take(chars).collect();
    s.push_str("...");
    s
}

/// Analyze with the built-in defaults.
pub fn analyze(request: &AnalyzeRequest) -> Result<AnalysisResult> {
    analyze_with(request, &AnalysisConfig::default())
}

/// Analyze one batch. Rejects undersized batches before any computation.
pub fn analyze_with(request: &AnalyzeRequest, cfg: &AnalysisConfig) -> Result<AnalysisResult> {
    let started = Instant::now();
    let out = run(request, cfg);
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    match &out {
        Ok(res) => {
            info!(
                reviews = res.metrics.total_reviews,
                eps = request.eps,
                min_samples = request.min_samples,
                clusters = res.metrics.num_clusters,
                noise = res.metrics.noise_points,
                elapsed_ms,
                "analysis finished"
            );
            crate::metrics::record_success(elapsed_ms, res.metrics.num_clusters);
        }
        Err(e) if e.is_client_error() => {
            warn!(reviews = request.reviews.len(), error = %e, "analysis rejected");
            crate::metrics::record_failure("rejected", elapsed_ms);
        }
        Err(e) => {
            error!(reviews = request.reviews.len(), error = %e, "analysis failed");
            crate::metrics::record_failure("failed", elapsed_ms);
        }
    }
    out
}

fn run(request: &AnalyzeRequest, cfg: &AnalysisConfig) -> Result<AnalysisResult> {
    let reviews = &request.reviews;
    let n = reviews.len();
    if n < cfg.min_reviews {
        return Err(AnalyzeError::NotEnoughReviews {
            got: n,
            min: cfg.min_reviews,
        });
    }
    let dbscan = Dbscan::new(request.eps, request.min_samples)?;

    let span = info_span!("analyze", reviews = n);
    let _guard = span.enter();

    let normalized: Vec<String> = reviews.iter().map(|r| normalize(&r.comment)).collect();
    let matrix = TfidfVectorizer::new(cfg.max_features).fit_transform(&normalized);
    debug!(terms = matrix.n_terms(), "vectorized");
    if matrix.n_terms() == 0 {
        debug!("empty vocabulary, every review will be noise");
    }

    let clusters = dbscan.fit_predict(&matrix.rows);

    let analyzer = SentimentAnalyzer::new();
    let sentiments: Vec<SentimentResult> = reviews
        .iter()
        .enumerate()
        .map(|(i, r)| analyzer.score(i, &r.comment))
        .collect();
    debug!("sentiment scored");

    let agg = aggregate(&clusters, &sentiments)?;

    let coords = project(&matrix.rows)?;
    if coords.nrows() != n {
        return Err(AnalyzeError::computation(format!(
            "projection returned {} rows for {} reviews",
            coords.nrows(),
            n
        )));
    }

    let pca = reviews
        .iter()
        .enumerate()
        .map(|(i, r)| VisualPoint {
            index: i,
            x: coords[[i, 0]],
            y: coords[[i, 1]],
            cluster: clusters[i],
            sentiment: sentiments[i].label,
            product: r.product.clone(),
            comment: preview(&r.comment, cfg.preview_chars),
        })
        .collect();

    Ok(AnalysisResult {
        clusters,
        sentiments,
        metrics: agg.metrics,
        sentiment_summary: agg.sentiment_summary,
        cluster_summary: agg.cluster_summary,
        visual_data: VisualData { pca },
    })
}
