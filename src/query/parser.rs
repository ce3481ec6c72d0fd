//! Parses raw search strings into a structured query representation.

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;
use regex::Regex;

use crate::analysis::stemmer::PorterStemmer;
use crate::analysis::stopwords::StopwordProvider;
use crate::cache::LruCache;
use crate::error::{CallaError, Result};
use crate::query::config::QueryParserConfig;

/// The structured form of a search query.
///
/// Produced once per parse call and treated as immutable afterwards;
/// consumed by the matcher and the autocomplete resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRepresentation {
    /// The caller's raw query string, preserved verbatim.
    pub original_query: String,

    /// Surviving terms in first-occurrence order, duplicates retained.
    pub terms: Vec<String>,

    /// Occurrence count per distinct term.
    pub term_frequency: AHashMap<String, usize>,

    /// Whether stopword removal was applied.
    pub stopwords_removed: bool,
}

/// Orchestrates tokenize → filter → stem → frequency-count for a search
/// string, according to an explicit configuration.
pub struct QueryParser {
    config: QueryParserConfig,
    pattern: Regex,
    stemmer: Arc<PorterStemmer>,
    stopwords: Arc<StopwordProvider>,
    stem_cache: Option<Mutex<LruCache<String, String>>>,
}

impl QueryParser {
    /// Create a parser. Fails with an invalid configuration error when the
    /// configuration does not validate.
    pub fn new(
        config: QueryParserConfig,
        stemmer: Arc<PorterStemmer>,
        stopwords: Arc<StopwordProvider>,
    ) -> Result<Self> {
        config.validate()?;
        let pattern = Regex::new(&config.tokenization_pattern).map_err(|e| {
            CallaError::invalid_config(format!("tokenization_pattern does not compile: {e}"))
        })?;
        let stem_cache = if config.enable_caching {
            Some(Mutex::new(LruCache::new(config.max_cache_size)?))
        } else {
            None
        };

        Ok(QueryParser {
            config,
            pattern,
            stemmer,
            stopwords,
            stem_cache,
        })
    }

    /// Parse a raw query string.
    ///
    /// Fails with an invalid query error when the input is empty or
    /// whitespace-only; there is no partial result.
    pub fn parse(&self, query: &str) -> Result<QueryRepresentation> {
        if query.trim().is_empty() {
            return Err(CallaError::invalid_query(
                "query must not be empty or whitespace-only",
            ));
        }

        let normalized = if self.config.convert_to_lowercase {
            query.trim().to_lowercase()
        } else {
            query.trim().to_string()
        };
        let cleaned: String = normalized
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();

        let tokens = self
            .pattern
            .split(&cleaned)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .filter(|token| {
                let length = token.chars().count();
                length >= self.config.min_word_length && length <= self.config.max_word_length
            });

        let filtered: Vec<&str> = if self.config.remove_stopwords {
            tokens
                .filter(|token| !self.stopwords.is_stopword(token))
                .collect()
        } else {
            tokens.collect()
        };

        let terms: Vec<String> = if self.config.enable_stemming {
            filtered.iter().map(|term| self.stem_term(term)).collect()
        } else {
            filtered.iter().map(|term| term.to_string()).collect()
        };

        let mut term_frequency = AHashMap::with_capacity(terms.len());
        for term in &terms {
            *term_frequency.entry(term.clone()).or_insert(0) += 1;
        }

        Ok(QueryRepresentation {
            original_query: query.to_string(),
            terms,
            term_frequency,
            stopwords_removed: self.config.remove_stopwords,
        })
    }

    /// The configuration this parser was built with.
    pub fn config(&self) -> &QueryParserConfig {
        &self.config
    }

    fn stem_term(&self, term: &str) -> String {
        if let Some(cache) = &self.stem_cache {
            let mut cache = cache.lock();
            if let Some(stemmed) = cache.get(&term.to_string()) {
                return stemmed.clone();
            }
            let stemmed = self.stemmer.stem(term);
            cache.put(term.to_string(), stemmed.clone());
            return stemmed;
        }
        self.stemmer.stem(term)
    }
}

impl std::fmt::Debug for QueryParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryParser")
            .field("config", &self.config)
            .finish()
    }
}
