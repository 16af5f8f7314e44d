//! # TF-IDF vectorizer
//! Builds a bounded vocabulary from the current corpus only and weights each
//! document with smoothed IDF, then L2-normalizes the rows.
//!
//! Vocabulary and IDF statistics live only as long as one call; nothing is
//! cached between requests.

use ndarray::Array2;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};

pub const DEFAULT_MAX_FEATURES: usize = 100;

/// Tokens of two or more word characters.
static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?u)\b\w\w+\b").expect("token regex"));

/// English stop list excluded from the vocabulary (the common 318-word list).
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
        "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
        "amongst", "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone",
        "anything", "anyway", "anywhere", "are", "around", "as", "at", "back", "be", "became",
        "because", "become", "becomes", "becoming", "been", "before", "beforehand", "behind",
        "being", "below", "beside", "besides", "between", "beyond", "bill", "both", "bottom",
        "but", "by", "call", "can", "cannot", "cant", "co", "con", "could", "couldnt", "cry",
        "de", "describe", "detail", "do", "done", "down", "due", "during", "each", "eg",
        "eight", "either", "eleven", "else", "elsewhere", "empty", "enough", "etc", "even",
        "ever", "every", "everyone", "everything", "everywhere", "except", "few", "fifteen",
        "fifty", "fill", "find", "fire", "first", "five", "for", "former", "formerly", "forty",
        "found", "four", "from", "front", "full", "further", "get", "give", "go", "had", "has",
        "hasnt", "have", "he", "hence", "her", "here", "hereafter", "hereby", "herein",
        "hereupon", "hers", "herself", "him", "himself", "his", "how", "however", "hundred",
        "i", "ie", "if", "in", "inc", "indeed", "interest", "into", "is", "it", "its", "itself",
        "keep", "last", "latter", "latterly", "least", "less", "ltd", "made", "many", "may",
        "me", "meanwhile", "might", "mill", "mine", "more", "moreover", "most", "mostly",
        "move", "much", "must", "my", "myself", "name", "namely", "neither", "never",
        "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
        "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
        "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
        "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem",
        "seemed", "seeming", "seems", "serious", "several", "she", "should", "show", "side",
        "since", "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something",
        "sometime", "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than",
        "that", "the", "their", "them", "themselves", "then", "thence", "there", "thereafter",
        "thereby", "therefore", "therein", "thereupon", "these", "they", "thick", "thin",
        "third", "this", "those", "though", "three", "through", "throughout", "thru", "thus",
        "to", "together", "too", "top", "toward", "towards", "twelve", "twenty", "two", "un",
        "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were",
        "what", "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas",
        "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while", "whither",
        "who", "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without",
        "would", "yet", "you", "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

/// N × V document-term matrix plus the vocabulary indexing its columns.
#[derive(Debug, Clone)]
pub struct DocumentMatrix {
    pub rows: Array2<f64>,
    pub vocabulary: Vec<String>,
}

impl DocumentMatrix {
    pub fn n_docs(&self) -> usize {
        self.rows.nrows()
    }

    pub fn n_terms(&self) -> usize {
        self.vocabulary.len()
    }
}

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token)
}

/// Vocabulary-eligible tokens of one (already normalized) document.
pub fn tokenize(doc: &str) -> Vec<String> {
    TOKEN
        .find_iter(doc)
        .map(|m| m.as_str().to_lowercase())
        .filter(|t| !is_stop_word(t))
        .collect()
}

/// Request-scoped TF-IDF vectorizer. Build one per corpus.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    max_features: usize,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FEATURES)
    }
}

impl TfidfVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features: max_features.max(1),
        }
    }

    /// Fit vocabulary + IDF on `corpus` and transform it in one pass.
    pub fn fit_transform<S: AsRef<str>>(&self, corpus: &[S]) -> DocumentMatrix {
        let docs: Vec<Vec<String>> = corpus.iter().map(|d| tokenize(d.as_ref())).collect();
        let vocabulary = self.select_vocabulary(&docs);
        let index: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();

        let n = docs.len();
        let v = vocabulary.len();
        let mut rows = Array2::<f64>::zeros((n, v));
        for (d, tokens) in docs.iter().enumerate() {
            for t in tokens {
                if let Some(&j) = index.get(t.as_str()) {
                    rows[[d, j]] += 1.0;
                }
            }
        }

        // Smoothed idf: ln((1 + n) / (1 + df)) + 1
        let idf: Vec<f64> = (0..v)
            .map(|j| {
                let df = rows.column(j).iter().filter(|&&c| c > 0.0).count() as f64;
                ((1.0 + n as f64) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        for mut row in rows.rows_mut() {
            for (j, w) in row.iter_mut().enumerate() {
                *w *= idf[j];
            }
            let norm = row.dot(&row).sqrt();
            if norm > 0.0 {
                row.mapv_inplace(|w| w / norm);
            }
        }

        DocumentMatrix { rows, vocabulary }
    }

    /// Top `max_features` terms by corpus frequency (ties alphabetical),
    /// returned in alphabetical order.
    fn select_vocabulary(&self, docs: &[Vec<String>]) -> Vec<String> {
        let mut freq: BTreeMap<&str, usize> = BTreeMap::new();
        for t in docs.iter().flatten() {
            *freq.entry(t.as_str()).or_insert(0) += 1;
        }

        let mut ranked: Vec<(&str, usize)> = freq.into_iter().collect();
        // BTreeMap order is alphabetical; a stable sort keeps it for ties.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(self.max_features);

        let mut vocab: Vec<String> = ranked.into_iter().map(|(t, _)| t.to_string()).collect();
        vocab.sort();
        vocab
    }
}

/// Convenience wrapper: fresh vectorizer, fit + transform.
pub fn vectorize<S: AsRef<str>>(corpus: &[S], max_features: usize) -> DocumentMatrix {
    TfidfVectorizer::new(max_features).fit_transform(corpus)
}
