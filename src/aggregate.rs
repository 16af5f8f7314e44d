//! # Aggregation
//! Collapses per-review cluster labels and sentiment results into the
//! summary blocks of the response: overall metrics, overall sentiment
//! percentages, and one summary per cluster (noise included).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cluster::NOISE;
use crate::error::{AnalyzeError, Result};
use crate::sentiment::{Sentiment, SentimentResult};

/// Counts keyed by polarity. Serializes as `{positive, neutral, negative}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentCounts {
    pub fn add(&mut self, s: Sentiment) {
        match s {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }

    pub fn get(&self, s: Sentiment) -> usize {
        match s {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }

    /// Label with the highest count; ties go positive, then neutral, then negative.
    pub fn dominant(&self) -> Sentiment {
        let mut best = Sentiment::ALL[0];
        for s in Sentiment::ALL.into_iter().skip(1) {
            if self.get(s) > self.get(best) {
                best = s;
            }
        }
        best
    }
}

impl FromIterator<Sentiment> for SentimentCounts {
    fn from_iter<I: IntoIterator<Item = Sentiment>>(iter: I) -> Self {
        let mut c = SentimentCounts::default();
        for s in iter {
            c.add(s);
        }
        c
    }
}

/// Share of each label across all reviews, in percent (one decimal).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl SentimentSummary {
    pub fn from_counts(counts: &SentimentCounts) -> Self {
        let total = counts.total();
        if total == 0 {
            return Self::default();
        }
        let pct = |n: usize| round1(n as f64 / total as f64 * 100.0);
        Self {
            positive: pct(counts.positive),
            neutral: pct(counts.neutral),
            negative: pct(counts.negative),
        }
    }
}

/// One row of `cluster_summary`. `avg_sentiment` is the dominant label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster: i32,
    pub count: usize,
    pub avg_sentiment: Sentiment,
    pub sentiment_distribution: SentimentCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub num_clusters: usize,
    pub noise_points: usize,
    pub total_reviews: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub metrics: Metrics,
    pub sentiment_summary: SentimentSummary,
    pub cluster_summary: Vec<ClusterSummary>,
}

/// Round to one decimal, exact ties to even (6.25 -> 6.2, 93.75 -> 93.8).
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round_ties_even() / 10.0
}

/// Build all summaries. `labels` and `sentiments` are parallel per review.
pub fn aggregate(labels: &[i32], sentiments: &[SentimentResult]) -> Result<Aggregation> {
    if labels.len() != sentiments.len() {
        return Err(AnalyzeError::computation(format!(
            "label/sentiment length mismatch ({} vs {})",
            labels.len(),
            sentiments.len()
        )));
    }

    let mut per_cluster: BTreeMap<i32, SentimentCounts> = BTreeMap::new();
    for (&label, s) in labels.iter().zip(sentiments) {
        per_cluster.entry(label).or_default().add(s.label);
    }

    let noise_points = labels.iter().filter(|&&l| l == NOISE).count();
    let num_clusters = per_cluster.keys().filter(|&&l| l != NOISE).count();

    let cluster_summary = per_cluster
        .iter()
        .map(|(&cluster, counts)| ClusterSummary {
            cluster,
            count: counts.total(),
            avg_sentiment: counts.dominant(),
            sentiment_distribution: *counts,
        })
        .collect();

    let overall: SentimentCounts = sentiments.iter().map(|s| s.label).collect();

    Ok(Aggregation {
        metrics: Metrics {
            num_clusters,
            noise_points,
            total_reviews: labels.len(),
        },
        sentiment_summary: SentimentSummary::from_counts(&overall),
        cluster_summary,
    })
}
