//! Delimiter-based tokenizer with per-token stemming.

use std::sync::Arc;

use crate::analysis::stemmer::PorterStemmer;
use crate::analysis::token::Token;

/// Punctuation treated as token boundaries, in addition to whitespace.
const DELIMITERS: &[char] = &[
    '?', '!', '"', '\'', '(', ')', '[', ']', '-', '_', '/', ':', ';', ',', '.',
];

/// Splits normalized text into position-tagged word tokens.
///
/// The whole text is lowercased, split on whitespace and a fixed set of
/// punctuation characters, and each surviving fragment is stemmed before
/// the token is built. Stemming here keeps index terms and query terms
/// aligned: both sides of a search pass through the same reduction.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stemmer: Arc<PorterStemmer>,
}

impl Tokenizer {
    /// Create a tokenizer using the given stemmer.
    pub fn new(stemmer: Arc<PorterStemmer>) -> Self {
        Tokenizer { stemmer }
    }

    /// Tokenize `text` into stemmed, position-tagged tokens.
    ///
    /// Empty or whitespace-only input yields an empty vector, never an
    /// error. Positions are assigned sequentially over the surviving
    /// fragments, starting at zero.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        self.split(text)
            .into_iter()
            .enumerate()
            .map(|(position, fragment)| Token::new(self.stemmer.stem(&fragment), position))
            .collect()
    }

    /// Tokenize without stemming, for callers that need surface forms
    /// (e.g. keyword extraction during document processing).
    pub fn tokenize_raw(&self, text: &str) -> Vec<Token> {
        self.split(text)
            .into_iter()
            .enumerate()
            .map(|(position, fragment)| Token::new(fragment, position))
            .collect()
    }

    fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        text.to_lowercase()
            .split(|c: char| c.is_whitespace() || DELIMITERS.contains(&c))
            .filter(|fragment| !fragment.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer::new(Arc::new(PorterStemmer::new()))
    }
}
