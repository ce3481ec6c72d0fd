//! Prefix-based autocomplete and query-term resolution.
//!
//! Prefix lookups are range scans over the sorted term keyspace: all terms
//! starting with `p` lie in `[p, p+1)`, where the upper bound increments
//! the prefix's last character. Results are cached with a TTL, keyed by
//! the lowercased input; a failing cache degrades to a miss.

use std::sync::Arc;
use std::time::Duration;

use ahash::AHashSet;
use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::analysis::stopwords::StopwordProvider;
use crate::error::Result;
use crate::index::InvertedIndexTerm;
use crate::query::parser::QueryRepresentation;
use crate::storage::{Cache, TermRange, TermStore};

/// Maximum number of suggestions returned for a prefix.
const SUGGESTION_LIMIT: usize = 10;

const PREFIX_CACHE_TTL: Duration = Duration::from_secs(10 * 60);
const QUERY_CACHE_TTL: Duration = Duration::from_secs(2 * 60);

/// Resolves prefixes (and parsed query terms) to candidate index terms,
/// backed by the TTL cache.
pub struct AutocompleteResolver {
    terms: Arc<dyn TermStore>,
    cache: Arc<dyn Cache>,
    stopwords: Arc<StopwordProvider>,
}

impl AutocompleteResolver {
    /// Create a resolver over the given term store and cache.
    pub fn new(
        terms: Arc<dyn TermStore>,
        cache: Arc<dyn Cache>,
        stopwords: Arc<StopwordProvider>,
    ) -> Self {
        AutocompleteResolver {
            terms,
            cache,
            stopwords,
        }
    }

    /// Suggest up to ten completions for a prefix.
    ///
    /// Index terms in `[prefix, prefix+1)` are merged with stopwords
    /// matching the prefix, deduplicated case-insensitively, and ordered
    /// by length then alphabetically, biasing towards shorter, more
    /// general completions.
    pub async fn suggest_by_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Ok(Vec::new());
        }

        let cache_key = format!("autocomplete:{prefix}");
        let index_terms: Vec<String> = match self.cache_get(&cache_key).await {
            Some(hit) => hit,
            None => {
                let range = prefix_range(&prefix);
                let entries = self
                    .terms
                    .scan_ranges(&[range], Some(SUGGESTION_LIMIT))
                    .await?;
                let terms: Vec<String> = entries.into_iter().map(|entry| entry.term).collect();
                self.cache_set(&cache_key, &terms, PREFIX_CACHE_TTL).await;
                terms
            }
        };

        let snapshot = self.stopwords.stopwords();
        let mut matching_stopwords: Vec<String> = snapshot
            .iter()
            .filter(|word| word.starts_with(&prefix))
            .cloned()
            .collect();
        matching_stopwords.sort();
        matching_stopwords.truncate(SUGGESTION_LIMIT);

        let mut seen = AHashSet::new();
        let mut combined: Vec<String> = index_terms
            .into_iter()
            .chain(matching_stopwords)
            .filter(|term| seen.insert(term.to_lowercase()))
            .collect();
        combined.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        combined.truncate(SUGGESTION_LIMIT);
        Ok(combined)
    }

    /// Resolve every distinct parsed term, treated as a prefix, to the
    /// matching index entries.
    ///
    /// The term list is first reduced to its minimal prefix set (a term
    /// that extends an already-kept prefix scans a subrange of it and is
    /// dropped), then a single OR-combined range query fetches the union.
    /// Cached by the full original query.
    pub async fn resolve_query_terms(
        &self,
        query: &QueryRepresentation,
    ) -> Result<Vec<InvertedIndexTerm>> {
        let cache_key = format!("autocomplete_query:{}", query.original_query.to_lowercase());
        if let Some(hit) = self.cache_get(&cache_key).await {
            return Ok(hit);
        }

        let prefixes = minimal_prefixes(&query.terms);
        if prefixes.is_empty() {
            return Ok(Vec::new());
        }

        let ranges: Vec<TermRange> = prefixes.iter().map(|p| prefix_range(p)).collect();
        let entries = self.terms.scan_ranges(&ranges, None).await?;
        self.cache_set(&cache_key, &entries, QUERY_CACHE_TTL).await;
        Ok(entries)
    }

    async fn cache_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).ok(),
            Ok(None) => None,
            Err(e) => {
                debug!("cache read for {key} failed, falling through to store: {e}");
                None
            }
        }
    }

    async fn cache_set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("serializing cache value for {key} failed: {e}");
                return;
            }
        };
        if let Err(e) = self.cache.set(key, raw, ttl).await {
            debug!("cache write for {key} failed: {e}");
        }
    }
}

impl std::fmt::Debug for AutocompleteResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutocompleteResolver").finish()
    }
}

/// Reduce terms to the minimal set of prefixes covering the same ranges:
/// sort lexicographically, then drop any term extending a kept prefix.
fn minimal_prefixes(terms: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = terms
        .iter()
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect();
    unique.sort();
    unique.dedup();

    let mut minimal: Vec<String> = Vec::new();
    for term in unique {
        if !minimal.iter().any(|kept| term.starts_with(kept.as_str())) {
            minimal.push(term);
        }
    }
    minimal
}

/// The half-open range `[prefix, upper)` covering every key starting with
/// `prefix`. The upper bound increments the last character; characters
/// without a successor (surrogate gap, char::MAX) fall back to widening
/// the range by dropping them.
fn prefix_range(prefix: &str) -> TermRange {
    let mut chars: Vec<char> = prefix.chars().collect();
    while let Some(last) = chars.pop() {
        if let Some(next) = char::from_u32(last as u32 + 1) {
            let mut upper: String = chars.iter().collect();
            upper.push(next);
            return (prefix.to_string(), Some(upper));
        }
    }
    (prefix.to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Posting;
    use crate::storage::memory::{MemoryCache, MemoryTermStore};

    async fn resolver_with_terms(terms: &[&str]) -> (AutocompleteResolver, Arc<MemoryTermStore>) {
        let store = Arc::new(MemoryTermStore::new());
        for term in terms {
            store
                .merge_postings(term, &[Posting::new("doc-1", 1)])
                .await
                .unwrap();
        }
        let resolver = AutocompleteResolver::new(
            store.clone(),
            Arc::new(MemoryCache::new()),
            Arc::new(StopwordProvider::new()),
        );
        (resolver, store)
    }

    #[test]
    fn test_prefix_range() {
        assert_eq!(
            prefix_range("ca"),
            ("ca".to_string(), Some("cb".to_string()))
        );
        assert_eq!(prefix_range("z"), ("z".to_string(), Some("{".to_string())));
    }

    #[test]
    fn test_minimal_prefixes() {
        let terms = vec!["car".to_string(), "ca".to_string(), "cat".to_string()];
        assert_eq!(minimal_prefixes(&terms), vec!["ca"]);

        let terms = vec!["dog".to_string(), "ca".to_string(), "cart".to_string()];
        assert_eq!(minimal_prefixes(&terms), vec!["ca", "dog"]);
    }

    #[test]
    fn test_minimal_prefixes_drops_blanks_and_duplicates() {
        let terms = vec!["  ".to_string(), "Cat".to_string(), "cat".to_string()];
        assert_eq!(minimal_prefixes(&terms), vec!["cat"]);
    }

    #[tokio::test]
    async fn test_suggest_empty_prefix() {
        let (resolver, _) = resolver_with_terms(&[]).await;
        assert!(resolver.suggest_by_prefix("  ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_suggest_matches_prefix_only() {
        let (resolver, _) = resolver_with_terms(&["cat", "car", "cart", "dog"]).await;
        let suggestions = resolver.suggest_by_prefix("ca").await.unwrap();

        assert!(suggestions.len() <= 10);
        assert!(suggestions.iter().all(|s| s.to_lowercase().starts_with("ca")));
        assert!(!suggestions.contains(&"dog".to_string()));
    }

    #[tokio::test]
    async fn test_suggest_sorted_by_length_then_alpha() {
        let (resolver, _) = resolver_with_terms(&["cart", "cat", "car"]).await;
        let suggestions = resolver.suggest_by_prefix("ca").await.unwrap();

        // "can"/"can't"/"cannot" come from the stopword list.
        let mut expected_order = suggestions.clone();
        expected_order.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        assert_eq!(suggestions, expected_order);
        assert!(suggestions.contains(&"can".to_string()));
    }

    #[tokio::test]
    async fn test_suggest_caps_at_ten() {
        let many: Vec<String> = (0..20).map(|i| format!("term{i:02}")).collect();
        let refs: Vec<&str> = many.iter().map(String::as_str).collect();
        let (resolver, _) = resolver_with_terms(&refs).await;

        let suggestions = resolver.suggest_by_prefix("term").await.unwrap();
        assert_eq!(suggestions.len(), 10);
    }

    #[tokio::test]
    async fn test_suggest_served_from_cache() {
        let (resolver, store) = resolver_with_terms(&["cat"]).await;
        let first = resolver.suggest_by_prefix("cat").await.unwrap();
        assert!(first.contains(&"cat".to_string()));

        // A term added after the first lookup is invisible until the TTL
        // lapses.
        store
            .merge_postings("catalog", &[Posting::new("doc-2", 1)])
            .await
            .unwrap();
        let second = resolver.suggest_by_prefix("cat").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_resolve_query_terms_minimal_scan() {
        let (resolver, _) = resolver_with_terms(&["ca", "car", "cat", "dog"]).await;
        let query = QueryRepresentation {
            original_query: "car ca cat".to_string(),
            terms: vec!["car".to_string(), "ca".to_string(), "cat".to_string()],
            term_frequency: Default::default(),
            stopwords_removed: true,
        };

        let entries = resolver.resolve_query_terms(&query).await.unwrap();
        let terms: Vec<&str> = entries.iter().map(|e| e.term.as_str()).collect();
        assert_eq!(terms, vec!["ca", "car", "cat"]);
    }

    #[tokio::test]
    async fn test_resolve_query_terms_empty() {
        let (resolver, _) = resolver_with_terms(&["cat"]).await;
        let query = QueryRepresentation {
            original_query: "??".to_string(),
            terms: Vec::new(),
            term_frequency: Default::default(),
            stopwords_removed: true,
        };
        assert!(resolver.resolve_query_terms(&query).await.unwrap().is_empty());
    }
}
