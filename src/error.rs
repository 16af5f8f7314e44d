//! # Analysis errors
//! Typed failures returned by the review pipeline. The HTTP layer maps each
//! kind to a status code; the core never panics on bad input.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyzeError {
    /// Input-size error: clustering needs at least `min` reviews.
    #[error("Need at least {min} reviews for clustering (got {got})")]
    NotEnoughReviews { got: usize, min: usize },

    /// Tuning parameter outside its domain (eps, min_samples).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Anything that went wrong inside the numeric pipeline.
    #[error("analysis failed: {0}")]
    Computation(String),
}

impl AnalyzeError {
    pub fn computation(msg: impl Into<String>) -> Self {
        Self::Computation(msg.into())
    }

    /// Caller-side problems (bad request) vs. internal failures.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotEnoughReviews { .. } | Self::InvalidParameter(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AnalyzeError>;
