//! Text normalization applied before vectorization.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("non-word regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Lowercase, drop punctuation (anything not a word char or whitespace),
/// collapse whitespace runs, trim. Total and idempotent.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lower, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}
