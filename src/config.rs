//! Service configuration: analysis defaults read from TOML, with env overrides.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::review::{DEFAULT_EPS, DEFAULT_MIN_SAMPLES};
use crate::vectorize::DEFAULT_MAX_FEATURES;

pub const DEFAULT_CONFIG_PATH: &str = "config/analysis.toml";
pub const DEFAULT_PREVIEW_CHARS: usize = 50;
pub const DEFAULT_MIN_REVIEWS: usize = 2;

pub const ENV_CONFIG_PATH: &str = "ANALYSIS_CONFIG_PATH";
pub const ENV_DEFAULT_EPS: &str = "ANALYSIS_DEFAULT_EPS";
pub const ENV_DEFAULT_MIN_SAMPLES: &str = "ANALYSIS_DEFAULT_MIN_SAMPLES";

fn default_eps() -> f64 {
    DEFAULT_EPS
}
fn default_min_samples() -> usize {
    DEFAULT_MIN_SAMPLES
}
fn default_max_features() -> usize {
    DEFAULT_MAX_FEATURES
}
fn default_preview_chars() -> usize {
    DEFAULT_PREVIEW_CHARS
}
fn default_min_reviews() -> usize {
    DEFAULT_MIN_REVIEWS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// eps used when a request to either analyze endpoint omits it.
    #[serde(default = "default_eps")]
    pub default_eps: f64,
    #[serde(default = "default_min_samples")]
    pub default_min_samples: usize,
    /// Vocabulary cap for the TF-IDF step.
    #[serde(default = "default_max_features")]
    pub max_features: usize,
    /// Characters of the comment kept in visual points (an ellipsis is appended).
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
    /// Smallest batch accepted for clustering.
    #[serde(default = "default_min_reviews")]
    pub min_reviews: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_eps: DEFAULT_EPS,
            default_min_samples: DEFAULT_MIN_SAMPLES,
            max_features: DEFAULT_MAX_FEATURES,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            min_reviews: DEFAULT_MIN_REVIEWS,
        }
    }
}

fn parse_eps_env(raw: Option<String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
}

fn parse_min_samples_env(raw: Option<String>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|v| *v >= 1)
}

impl AnalysisConfig {
    /// Resolve the path (`ANALYSIS_CONFIG_PATH` or the default), load it and
    /// apply env overrides. A missing file means defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut cfg = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            tracing::debug!(path = %path.display(), "no analysis config file, using defaults");
            Self::default()
        };
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read analysis config at {}: {}", path.display(), e)
        })?;
        Self::from_toml_str(&data)
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let cfg: AnalysisConfig = toml::from_str(s)?;
        Ok(cfg.sanitized())
    }

    /// Apply `ANALYSIS_DEFAULT_EPS` / `ANALYSIS_DEFAULT_MIN_SAMPLES`; unparsable
    /// or out-of-range values are ignored.
    pub fn apply_env(&mut self) {
        if let Some(eps) = parse_eps_env(std::env::var(ENV_DEFAULT_EPS).ok()) {
            self.default_eps = eps;
        }
        if let Some(ms) = parse_min_samples_env(std::env::var(ENV_DEFAULT_MIN_SAMPLES).ok()) {
            self.default_min_samples = ms;
        }
    }

    /// Replace out-of-range values with defaults.
    pub fn sanitized(mut self) -> Self {
        if !self.default_eps.is_finite() || self.default_eps <= 0.0 {
            self.default_eps = DEFAULT_EPS;
        }
        if self.default_min_samples == 0 {
            self.default_min_samples = DEFAULT_MIN_SAMPLES;
        }
        if self.max_features == 0 {
            self.max_features = DEFAULT_MAX_FEATURES;
        }
        if self.min_reviews == 0 {
            self.min_reviews = DEFAULT_MIN_REVIEWS;
        }
        self
    }
}
