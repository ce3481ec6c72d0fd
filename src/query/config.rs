//! Query parser configuration.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CallaError, Result};

/// Configuration for [`crate::query::QueryParser`] behavior.
///
/// Validated at parser construction; an invalid configuration fails there
/// rather than at first use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryParserConfig {
    /// Whether to stem parsed terms.
    pub enable_stemming: bool,

    /// Whether to remove stopwords from queries.
    pub remove_stopwords: bool,

    /// Whether to lowercase the query before tokenization.
    pub convert_to_lowercase: bool,

    /// Minimum term length to keep.
    pub min_word_length: usize,

    /// Maximum term length to keep. Must exceed `min_word_length`.
    pub max_word_length: usize,

    /// Regex the query is split on. Must be non-empty and compile.
    pub tokenization_pattern: String,

    /// Whether to cache stemmer output (`term → stem`).
    pub enable_caching: bool,

    /// Capacity of the stemming cache. Must be positive.
    pub max_cache_size: usize,
}

impl Default for QueryParserConfig {
    fn default() -> Self {
        QueryParserConfig {
            enable_stemming: true,
            remove_stopwords: true,
            convert_to_lowercase: true,
            min_word_length: 2,
            max_word_length: 50,
            tokenization_pattern: r"\W+".to_string(),
            enable_caching: true,
            max_cache_size: 1000,
        }
    }
}

impl QueryParserConfig {
    /// Preset favoring throughput: stricter length floor, larger stem cache.
    pub fn performance() -> Self {
        QueryParserConfig {
            min_word_length: 3,
            max_word_length: 30,
            max_cache_size: 5000,
            ..Default::default()
        }
    }

    /// Preset favoring completeness over speed: no length floor, wider
    /// length ceiling, no caching.
    pub fn accuracy() -> Self {
        QueryParserConfig {
            min_word_length: 1,
            max_word_length: 100,
            enable_caching: false,
            ..Default::default()
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_word_length == 0 {
            return Err(CallaError::invalid_config(
                "max_word_length must be positive",
            ));
        }
        if self.min_word_length > self.max_word_length {
            return Err(CallaError::invalid_config(format!(
                "min_word_length ({}) must not exceed max_word_length ({})",
                self.min_word_length, self.max_word_length
            )));
        }
        if self.max_cache_size == 0 {
            return Err(CallaError::invalid_config("max_cache_size must be positive"));
        }
        if self.tokenization_pattern.trim().is_empty() {
            return Err(CallaError::invalid_config(
                "tokenization_pattern must not be empty",
            ));
        }
        if let Err(e) = Regex::new(&self.tokenization_pattern) {
            return Err(CallaError::invalid_config(format!(
                "tokenization_pattern does not compile: {e}"
            )));
        }
        Ok(())
    }
}
