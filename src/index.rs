//! Inverted-index data model and maintenance.
//!
//! # Modules
//!
//! - [`indexer`]: Incremental and batched index writes
//! - [`queue`]: Buffer between document ingestion and the batch indexer
//! - [`worker`]: Background task that flushes the queue on a schedule

pub mod indexer;
pub mod queue;
pub mod worker;

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-exports
pub use indexer::Indexer;
pub use queue::{IndexingQueue, QueueItem};
pub use worker::{IndexWorker, WorkerConfig, WorkerHandle};

/// Term → occurrence count for a single document or query.
pub type TermFrequencies = AHashMap<String, u32>;

/// Identifier of a document known to the document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        DocumentId(Uuid::new_v4().to_string())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        DocumentId(value)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        DocumentId(value.to_string())
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One (document, term-frequency) pair recorded under an index term.
///
/// Owned exclusively by its parent [`InvertedIndexTerm`]; a term holds at
/// most one posting per document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// The document containing the term.
    #[serde(rename = "docId")]
    pub document_id: DocumentId,

    /// Number of occurrences of the term within that document.
    #[serde(rename = "tf")]
    pub term_frequency: u32,
}

impl Posting {
    /// Create a new posting.
    pub fn new<D: Into<DocumentId>>(document_id: D, term_frequency: u32) -> Self {
        Posting {
            document_id: document_id.into(),
            term_frequency,
        }
    }
}

/// An entry of the inverted index: a term with its posting list and
/// aggregate statistics.
///
/// Invariants: `document_frequency` equals the number of distinct
/// documents in `postings`, and `total_occurrences` equals the sum of
/// their term frequencies. The store's merge operation maintains both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvertedIndexTerm {
    /// The term itself; primary key of the term store.
    pub term: String,

    /// Postings, unique per document.
    pub postings: Vec<Posting>,

    /// Number of distinct documents containing the term.
    #[serde(rename = "df")]
    pub document_frequency: u32,

    /// Sum of term frequencies across all postings.
    #[serde(rename = "totalOccurrences")]
    pub total_occurrences: u64,

    /// When the entry was last written.
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
}

impl InvertedIndexTerm {
    /// Create an empty entry for a term.
    pub fn new<S: Into<String>>(term: S) -> Self {
        InvertedIndexTerm {
            term: term.into(),
            postings: Vec::new(),
            document_frequency: 0,
            total_occurrences: 0,
            last_updated: Utc::now(),
        }
    }

    /// Recompute `document_frequency` and `total_occurrences` from the
    /// posting list.
    pub fn recount(&mut self) {
        self.document_frequency = self.postings.len() as u32;
        self.total_occurrences = self
            .postings
            .iter()
            .map(|p| p.term_frequency as u64)
            .sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_uniqueness() {
        assert_ne!(DocumentId::new(), DocumentId::new());
    }

    #[test]
    fn test_recount() {
        let mut entry = InvertedIndexTerm::new("search");
        entry.postings.push(Posting::new("doc-1", 3));
        entry.postings.push(Posting::new("doc-2", 2));
        entry.recount();

        assert_eq!(entry.document_frequency, 2);
        assert_eq!(entry.total_occurrences, 5);
    }

    #[test]
    fn test_serde_roundtrip_field_names() {
        let mut entry = InvertedIndexTerm::new("search");
        entry.postings.push(Posting::new("doc-1", 3));
        entry.recount();

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["df"], 1);
        assert_eq!(json["totalOccurrences"], 3);
        assert_eq!(json["postings"][0]["docId"], "doc-1");
        assert_eq!(json["postings"][0]["tf"], 3);
    }
}
