//! # Review input types
//! Request-side records: a single review, the analyze request with its two
//! tuning knobs, and the product-catalog shape that reviews can be flattened
//! out of.

use serde::{Deserialize, Serialize};

pub const DEFAULT_EPS: f64 = 0.5;
pub const DEFAULT_MIN_SAMPLES: usize = 2;

/// One customer review. Identity is its position in the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub product: String,
    pub reviewer: String,
    pub rating: f64,
    pub comment: String,
}

fn default_eps() -> f64 {
    DEFAULT_EPS
}
fn default_min_samples() -> usize {
    DEFAULT_MIN_SAMPLES
}

/// One analysis run: the reviews plus both DBSCAN knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub reviews: Vec<Review>,
    #[serde(default = "default_eps")]
    pub eps: f64,
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
}

impl AnalyzeRequest {
    pub fn new(reviews: Vec<Review>) -> Self {
        Self {
            reviews,
            eps: DEFAULT_EPS,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }

    pub fn with_params(mut self, eps: f64, min_samples: usize) -> Self {
        self.eps = eps;
        self.min_samples = min_samples;
        self
    }
}

/// Wire body of `POST /analyze`. Missing knobs are filled from the service
/// config rather than the built-in defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeBody {
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub eps: Option<f64>,
    #[serde(default)]
    pub min_samples: Option<usize>,
}

impl AnalyzeBody {
    pub fn into_request(self, default_eps: f64, default_min_samples: usize) -> AnalyzeRequest {
        AnalyzeRequest {
            reviews: self.reviews,
            eps: self.eps.unwrap_or(default_eps),
            min_samples: self.min_samples.unwrap_or(default_min_samples),
        }
    }
}

/// A review as it appears nested inside a catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogReview {
    pub rating: f64,
    pub comment: String,
    #[serde(default)]
    pub reviewer_name: String,
}

/// Catalog product (title plus its reviews). Extra catalog fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub title: String,
    #[serde(default)]
    pub reviews: Vec<CatalogReview>,
}

/// Body of `POST /analyze/products`. Tuning knobs fall back to the service config.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductsRequest {
    pub products: Vec<CatalogProduct>,
    #[serde(default)]
    pub eps: Option<f64>,
    #[serde(default)]
    pub min_samples: Option<usize>,
}

/// Flatten catalog products into reviews, product order first, then review order.
pub fn reviews_from_products(products: &[CatalogProduct]) -> Vec<Review> {
    products
        .iter()
        .flat_map(|p| {
            p.reviews.iter().map(move |r| Review {
                product: p.title.clone(),
                reviewer: r.reviewer_name.clone(),
                rating: r.rating,
                comment: r.comment.clone(),
            })
        })
        .collect()
}
