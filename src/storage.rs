//! Storage abstractions for the engine's external collaborators.
//!
//! The engine itself is storage-agnostic: it reads and writes the
//! inverted index through [`TermStore`], stamps documents through
//! [`DocumentStore`], and keeps hot results in a [`Cache`]. Production
//! deployments back these traits with a document database and a key-value
//! cache; [`memory`] provides in-process backends for tests and embedded
//! use.

pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::index::{DocumentId, InvertedIndexTerm, Posting};

/// A half-open lexicographic key range `[start, end)`. An absent end bound
/// means the range is unbounded above.
pub type TermRange = (String, Option<String>);

/// Access to the persistent inverted-index term collection, keyed by term.
///
/// Implementations must provide point lookup/replace, ascending
/// lexicographic range scans, and an atomic posting merge
/// ("insert the entry if absent, overwrite the posting for a document
/// that already has one, append otherwise, recompute the counters").
/// The merge being atomic is what keeps concurrent writers from losing
/// updates; the engine performs no read-modify-write cycles of its own.
#[async_trait]
pub trait TermStore: Send + Sync {
    /// Fetch a single entry by term.
    async fn get(&self, term: &str) -> Result<Option<InvertedIndexTerm>>;

    /// Insert or fully replace an entry.
    async fn replace(&self, entry: InvertedIndexTerm) -> Result<()>;

    /// Atomically merge postings into the entry for `term`, creating the
    /// entry when absent. A posting whose document already appears in the
    /// entry overwrites that posting's frequency; new documents are
    /// appended. `document_frequency` and `total_occurrences` are
    /// recomputed from the resulting posting list, and `last_updated` is
    /// stamped.
    async fn merge_postings(&self, term: &str, postings: &[Posting]) -> Result<()>;

    /// Scan the given ranges in ascending term order, returning the union
    /// of matching entries, truncated to `limit` when given.
    async fn scan_ranges(
        &self,
        ranges: &[TermRange],
        limit: Option<usize>,
    ) -> Result<Vec<InvertedIndexTerm>>;

    /// Number of terms in the store.
    async fn count(&self) -> Result<u64>;
}

/// Access to the persistent document collection.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Total number of documents, indexed or not.
    async fn count(&self) -> Result<u64>;

    /// Bulk-set the `indexed_at` timestamp on the given documents.
    async fn mark_indexed(&self, ids: &[DocumentId], at: DateTime<Utc>) -> Result<()>;
}

/// A key-value cache with per-entry time-to-live.
///
/// Values are serialized strings (the resolver stores JSON). Callers treat
/// any error from these methods as a cache miss and fall through to the
/// backing store.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Fetch a value, `None` on miss or expiry.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value for `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;
}
