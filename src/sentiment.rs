//! # Sentiment scorer
//! Valence-lexicon scoring with negation, booster, capitalization,
//! contrast ("but") and punctuation heuristics. Produces pos/neu/neg
//! proportions plus a compound score in [-1, 1].
//!
//! The lexicon is parsed once and shared read-only; the analyzer itself holds
//! no state, so every review is scored independently.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

static LEXICON: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, f64>>(raw).expect("valid sentiment lexicon")
});

/// Score added/removed by an intensifier ("very") or dampener ("slightly").
const B_INCR: f64 = 0.293;
const B_DECR: f64 = -0.293;
/// Emphasis for an ALL-CAPS sentiment word in mixed-case text.
const C_INCR: f64 = 0.733;
/// Multiplier applied to a negated valence.
const N_SCALAR: f64 = -0.74;
/// Normalization constant for the compound score.
const ALPHA: f64 = 15.0;

pub const POSITIVE_THRESHOLD: f64 = 0.05;
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

static BOOSTERS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    let up = [
        "absolutely", "amazingly", "awfully", "completely", "considerably", "decidedly",
        "deeply", "enormously", "entirely", "especially", "exceptionally", "extremely",
        "fabulously", "greatly", "highly", "hugely", "incredibly", "intensely", "majorly",
        "more", "most", "particularly", "purely", "quite", "really", "remarkably", "so",
        "substantially", "thoroughly", "totally", "tremendously", "uber", "unbelievably",
        "unusually", "utterly", "very", "super", "truly",
    ];
    let down = [
        "almost", "barely", "hardly", "kinda", "less", "little", "marginally", "occasionally",
        "partly", "scarcely", "slightly", "somewhat", "sorta",
    ];
    up.into_iter()
        .map(|w| (w, B_INCR))
        .chain(down.into_iter().map(|w| (w, B_DECR)))
        .collect()
});

static NEGATORS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "aint", "arent", "cannot", "cant", "couldnt", "darent", "didnt", "doesnt", "dont",
        "hadnt", "hasnt", "havent", "isnt", "mightnt", "mustnt", "neither", "never", "none",
        "nope", "nor", "not", "nothing", "nowhere", "shant", "shouldnt", "wasnt", "werent",
        "without", "wont", "wouldnt", "rarely", "seldom", "despite",
    ]
    .into_iter()
    .collect()
});

/// Three-way polarity label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Fixed priority order, also used to break ties.
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn from_compound(compound: f64) -> Self {
        if compound >= POSITIVE_THRESHOLD {
            Sentiment::Positive
        } else if compound <= NEGATIVE_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw polarity scores. pos + neu + neg ≈ 1 for non-empty text.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

/// Per-review result; `index` is the review's position in the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub index: usize,
    pub label: Sentiment,
    pub scores: SentimentScores,
}

impl SentimentResult {
    pub fn from_scores(index: usize, scores: SentimentScores) -> Self {
        Self {
            index,
            label: Sentiment::from_compound(scores.compound),
            scores,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Lexicon valence for a lowercase word (0 if unknown).
    #[inline]
    fn word_valence(&self, w: &str) -> f64 {
        LEXICON.get(w).copied().unwrap_or(0.0)
    }

    pub fn score(&self, index: usize, text: &str) -> SentimentResult {
        SentimentResult::from_scores(index, self.polarity_scores(text))
    }

    pub fn polarity_scores(&self, text: &str) -> SentimentScores {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return SentimentScores::default();
        }
        let lower: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
        let cap_diff = is_cap_diff(&tokens);

        let mut valences = Vec::with_capacity(tokens.len());
        for i in 0..tokens.len() {
            let w = lower[i].as_str();
            let is_kind_of = w == "kind" && lower.get(i + 1).is_some_and(|n| n == "of");
            if BOOSTERS.contains_key(w) || is_kind_of {
                valences.push(0.0);
                continue;
            }
            valences.push(self.token_valence(i, &tokens, &lower, cap_diff));
        }

        but_check(&lower, &mut valences);
        score_valence(&valences, text)
    }

    fn token_valence(&self, i: usize, tokens: &[String], lower: &[String], cap_diff: bool) -> f64 {
        let w = lower[i].as_str();
        let mut valence = self.word_valence(w);
        if valence == 0.0 {
            return 0.0;
        }

        // "no" used as a determiner ("no problems") carries no valence of its own.
        if w == "no" && lower.get(i + 1).is_some_and(|n| self.word_valence(n) != 0.0) {
            return 0.0;
        }
        if i > 0 && lower[i - 1] == "no" {
            valence *= N_SCALAR;
        }

        if cap_diff && is_upper(&tokens[i]) {
            valence += C_INCR.copysign(valence);
        }

        for back in 1..=3usize {
            if i < back {
                break;
            }
            let prev = lower[i - back].as_str();
            if self.word_valence(prev) == 0.0 {
                let mut s = booster_scalar(prev, &tokens[i - back], valence, cap_diff);
                match back {
                    2 => s *= 0.95,
                    3 => s *= 0.9,
                    _ => {}
                }
                valence += s;
            }
            valence = negation_check(valence, lower, i, back);
        }

        least_check(valence, lower, i)
    }
}

/// Whitespace tokens with surrounding punctuation stripped; single chars dropped.
fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| !c.is_alphanumeric())
                .replace('\'', "")
                .replace('\u{2019}', "")
        })
        .filter(|t| t.chars().count() > 1)
        .collect()
}

fn is_upper(token: &str) -> bool {
    token.chars().any(|c| c.is_alphabetic()) && !token.chars().any(|c| c.is_lowercase())
}

/// True when some but not all tokens are ALL-CAPS.
fn is_cap_diff(tokens: &[String]) -> bool {
    let upper = tokens.iter().filter(|t| is_upper(t)).count();
    upper > 0 && upper < tokens.len()
}

fn is_negated(word: &str) -> bool {
    NEGATORS.contains(word)
}

fn booster_scalar(lower: &str, original: &str, valence: f64, cap_diff: bool) -> f64 {
    let Some(&base) = BOOSTERS.get(lower) else {
        return 0.0;
    };
    let mut scalar = if valence < 0.0 { -base } else { base };
    if cap_diff && is_upper(original) {
        scalar += if valence > 0.0 { C_INCR } else { -C_INCR };
    }
    scalar
}

fn negation_check(valence: f64, lower: &[String], i: usize, back: usize) -> f64 {
    let w = |k: usize| lower[i - k].as_str();
    match back {
        1 if is_negated(w(1)) => valence * N_SCALAR,
        2 => {
            if w(2) == "never" && matches!(w(1), "so" | "this") {
                valence * 1.25
            } else if is_negated(w(2)) {
                valence * N_SCALAR
            } else {
                valence
            }
        }
        3 => {
            if w(3) == "never" && (matches!(w(2), "so" | "this") || matches!(w(1), "so" | "this")) {
                valence * 1.25
            } else if is_negated(w(3)) {
                valence * N_SCALAR
            } else {
                valence
            }
        }
        _ => valence,
    }
}

/// "least <word>" flips polarity unless it reads "at least" / "very least".
fn least_check(valence: f64, lower: &[String], i: usize) -> f64 {
    if i >= 1 && lower[i - 1] == "least" {
        let guarded = i >= 2 && matches!(lower[i - 2].as_str(), "at" | "very");
        if !guarded {
            return valence * N_SCALAR;
        }
    }
    valence
}

/// Contrast: sentiment before "but" is damped, after it amplified.
fn but_check(lower: &[String], valences: &mut [f64]) {
    let Some(bi) = lower.iter().position(|w| w == "but") else {
        return;
    };
    for (k, v) in valences.iter_mut().enumerate() {
        if k < bi {
            *v *= 0.5;
        } else if k > bi {
            *v *= 1.5;
        }
    }
}

fn punctuation_emphasis(text: &str) -> f64 {
    let ep = text.matches('!').count().min(4) as f64 * 0.292;
    let qm = match text.matches('?').count() {
        0 | 1 => 0.0,
        n @ 2..=3 => n as f64 * 0.18,
        _ => 0.96,
    };
    ep + qm
}

fn normalize_compound(score: f64) -> f64 {
    (score / (score * score + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

fn round_to(x: f64, places: i32) -> f64 {
    let m = 10f64.powi(places);
    (x * m).round() / m
}

fn score_valence(valences: &[f64], text: &str) -> SentimentScores {
    let punct = punctuation_emphasis(text);
    let mut sum: f64 = valences.iter().sum();
    if sum > 0.0 {
        sum += punct;
    } else if sum < 0.0 {
        sum -= punct;
    }
    let compound = normalize_compound(sum);

    let mut pos_sum = 0.0;
    let mut neg_sum = 0.0;
    let mut neu_count = 0.0;
    for &v in valences {
        if v > 0.0 {
            pos_sum += v + 1.0;
        } else if v < 0.0 {
            neg_sum += v - 1.0;
        } else {
            neu_count += 1.0;
        }
    }
    if pos_sum > neg_sum.abs() {
        pos_sum += punct;
    } else if pos_sum < neg_sum.abs() {
        neg_sum -= punct;
    }

    let total = pos_sum + neg_sum.abs() + neu_count;
    if total == 0.0 {
        return SentimentScores::default();
    }
    SentimentScores {
        neg: round_to((neg_sum / total).abs(), 3),
        neu: round_to((neu_count / total).abs(), 3),
        pos: round_to((pos_sum / total).abs(), 3),
        compound: round_to(compound, 4),
    }
}
