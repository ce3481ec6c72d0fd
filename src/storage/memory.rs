//! In-memory storage backends.
//!
//! Used by the test suite and by embedded deployments that do not need
//! persistence. The term store keeps entries in a `BTreeMap`, which gives
//! the ascending lexicographic range scans the autocomplete resolver
//! relies on.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::time::{Duration, Instant};

use ahash::AHashMap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::error::Result;
use crate::index::{DocumentId, InvertedIndexTerm, Posting};
use crate::storage::{Cache, DocumentStore, TermRange, TermStore};

/// In-memory [`TermStore`] backed by a `BTreeMap` under a read-write lock.
///
/// `merge_postings` runs entirely under the write lock, which makes it
/// atomic with respect to concurrent writers.
#[derive(Debug, Default)]
pub struct MemoryTermStore {
    entries: RwLock<BTreeMap<String, InvertedIndexTerm>>,
}

impl MemoryTermStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TermStore for MemoryTermStore {
    async fn get(&self, term: &str) -> Result<Option<InvertedIndexTerm>> {
        Ok(self.entries.read().get(term).cloned())
    }

    async fn replace(&self, entry: InvertedIndexTerm) -> Result<()> {
        self.entries.write().insert(entry.term.clone(), entry);
        Ok(())
    }

    async fn merge_postings(&self, term: &str, postings: &[Posting]) -> Result<()> {
        let mut entries = self.entries.write();
        let entry = entries
            .entry(term.to_string())
            .or_insert_with(|| InvertedIndexTerm::new(term));

        for posting in postings {
            match entry
                .postings
                .iter_mut()
                .find(|p| p.document_id == posting.document_id)
            {
                Some(existing) => existing.term_frequency = posting.term_frequency,
                None => entry.postings.push(posting.clone()),
            }
        }
        entry.recount();
        entry.last_updated = Utc::now();
        Ok(())
    }

    async fn scan_ranges(
        &self,
        ranges: &[TermRange],
        limit: Option<usize>,
    ) -> Result<Vec<InvertedIndexTerm>> {
        let entries = self.entries.read();
        let mut matched: BTreeMap<String, InvertedIndexTerm> = BTreeMap::new();
        for (start, end) in ranges {
            let upper = match end {
                Some(e) => Bound::Excluded(e.clone()),
                None => Bound::Unbounded,
            };
            for (term, entry) in entries.range((Bound::Included(start.clone()), upper)) {
                matched.insert(term.clone(), entry.clone());
            }
        }

        let results = matched.into_values();
        Ok(match limit {
            Some(n) => results.take(n).collect(),
            None => results.collect(),
        })
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.entries.read().len() as u64)
    }
}

/// In-memory [`DocumentStore`].
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<AHashMap<DocumentId, Option<DateTime<Utc>>>>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document as uploaded but not yet indexed.
    pub fn insert(&self, id: DocumentId) {
        self.documents.write().insert(id, None);
    }

    /// The `indexed_at` timestamp of a document, when it has been stamped.
    pub fn indexed_at(&self, id: &DocumentId) -> Option<DateTime<Utc>> {
        self.documents.read().get(id).copied().flatten()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn count(&self) -> Result<u64> {
        Ok(self.documents.read().len() as u64)
    }

    async fn mark_indexed(&self, ids: &[DocumentId], at: DateTime<Utc>) -> Result<()> {
        let mut documents = self.documents.write();
        for id in ids {
            documents.insert(id.clone(), Some(at));
        }
        Ok(())
    }
}

/// In-memory [`Cache`] with per-entry expiry. Expired entries are evicted
/// lazily on read.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<AHashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some((value, expires_at)) if *expires_at > Instant::now() => {
                    return Ok(Some(value.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }
        self.entries.write().remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.entries
            .write()
            .insert(key.to_string(), (value, Instant::now() + ttl));
        Ok(())
    }
}
