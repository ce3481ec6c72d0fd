//! Inverted-index maintenance.

use std::sync::Arc;

use ahash::AHashMap;
use chrono::Utc;
use log::{debug, warn};

use crate::error::Result;
use crate::index::{DocumentId, Posting, TermFrequencies};
use crate::storage::{DocumentStore, TermStore};

/// Creates and updates inverted-index entries and stamps documents as
/// indexed.
///
/// The indexer is the sole writer to the term store. All write paths go
/// through the store's atomic posting merge, so applying the same input
/// twice leaves counters and posting lists unchanged, and concurrent
/// writers cannot lose updates to each other.
pub struct Indexer {
    terms: Arc<dyn TermStore>,
    documents: Arc<dyn DocumentStore>,
}

impl Indexer {
    /// Create an indexer over the given stores.
    pub fn new(terms: Arc<dyn TermStore>, documents: Arc<dyn DocumentStore>) -> Self {
        Indexer { terms, documents }
    }

    /// Index a single document's term frequencies, one merge per term.
    ///
    /// Store failures are propagated to the caller and not retried.
    pub async fn update_one(
        &self,
        term_frequencies: &TermFrequencies,
        document_id: &DocumentId,
    ) -> Result<()> {
        for (term, tf) in term_frequencies {
            let posting = Posting::new(document_id.clone(), *tf);
            self.terms.merge_postings(term, &[posting]).await?;
        }
        Ok(())
    }

    /// Index a batch with one upsert per (document, term) pair.
    ///
    /// Duplicate (term, document) pairs within the batch collapse to the
    /// last occurrence before any write is issued.
    pub async fn batch_insert(&self, documents: &[(DocumentId, TermFrequencies)]) -> Result<()> {
        let mut deduped: AHashMap<(&str, &DocumentId), u32> = AHashMap::new();
        for (document_id, term_frequencies) in documents {
            for (term, tf) in term_frequencies {
                deduped.insert((term.as_str(), document_id), *tf);
            }
        }

        for ((term, document_id), tf) in deduped {
            let posting = Posting::new(document_id.clone(), tf);
            self.terms.merge_postings(term, &[posting]).await?;
        }
        Ok(())
    }

    /// Index a batch with one upsert per distinct term.
    ///
    /// All postings for a term across the whole batch are grouped first
    /// and applied together, which cuts store round-trips and guarantees
    /// they land in one atomic merge. This is the preferred path for the
    /// background worker. After the index writes, every document in the
    /// batch is stamped as indexed (best-effort; a stamping failure is
    /// logged, not propagated).
    pub async fn batch_update_grouped(
        &self,
        documents: &[(DocumentId, TermFrequencies)],
    ) -> Result<()> {
        let mut grouped: AHashMap<&str, Vec<Posting>> = AHashMap::new();
        for (document_id, term_frequencies) in documents {
            for (term, tf) in term_frequencies {
                let postings = grouped.entry(term.as_str()).or_default();
                match postings
                    .iter_mut()
                    .find(|p| p.document_id == *document_id)
                {
                    Some(existing) => existing.term_frequency = *tf,
                    None => postings.push(Posting::new(document_id.clone(), *tf)),
                }
            }
        }

        debug!(
            "applying grouped batch: {} document(s), {} distinct term(s)",
            documents.len(),
            grouped.len()
        );
        for (term, postings) in grouped {
            self.terms.merge_postings(term, &postings).await?;
        }

        let ids: Vec<DocumentId> = documents.iter().map(|(id, _)| id.clone()).collect();
        if let Err(e) = self.mark_indexed(&ids).await {
            warn!("failed to stamp {} document(s) as indexed: {e}", ids.len());
        }
        Ok(())
    }

    /// Bulk-set the indexed-at timestamp on the given documents.
    pub async fn mark_indexed(&self, ids: &[DocumentId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.documents.mark_indexed(ids, Utc::now()).await
    }
}

impl std::fmt::Debug for Indexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Indexer").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::InvertedIndexTerm;
    use crate::storage::memory::{MemoryDocumentStore, MemoryTermStore};

    fn frequencies(pairs: &[(&str, u32)]) -> TermFrequencies {
        pairs
            .iter()
            .map(|(term, tf)| (term.to_string(), *tf))
            .collect()
    }

    fn indexer() -> (Indexer, Arc<MemoryTermStore>, Arc<MemoryDocumentStore>) {
        let terms = Arc::new(MemoryTermStore::new());
        let documents = Arc::new(MemoryDocumentStore::new());
        (
            Indexer::new(terms.clone(), documents.clone()),
            terms,
            documents,
        )
    }

    async fn entry(terms: &MemoryTermStore, term: &str) -> InvertedIndexTerm {
        use crate::storage::TermStore;
        terms.get(term).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_update_one_creates_and_updates() {
        let (indexer, terms, _) = indexer();
        let doc = DocumentId::from("doc-1");

        indexer
            .update_one(&frequencies(&[("cat", 2), ("dog", 1)]), &doc)
            .await
            .unwrap();

        let cat = entry(&terms, "cat").await;
        assert_eq!(cat.document_frequency, 1);
        assert_eq!(cat.total_occurrences, 2);

        // Re-indexing the same document replaces its posting.
        indexer
            .update_one(&frequencies(&[("cat", 5)]), &doc)
            .await
            .unwrap();
        let cat = entry(&terms, "cat").await;
        assert_eq!(cat.document_frequency, 1);
        assert_eq!(cat.total_occurrences, 5);
    }

    #[tokio::test]
    async fn test_batch_update_grouped() {
        let (indexer, terms, documents) = indexer();
        let doc_a = DocumentId::from("doc-a");
        let doc_b = DocumentId::from("doc-b");
        documents.insert(doc_a.clone());
        documents.insert(doc_b.clone());

        let batch = vec![
            (doc_a.clone(), frequencies(&[("cat", 2)])),
            (doc_b.clone(), frequencies(&[("cat", 1), ("dog", 1)])),
        ];
        indexer.batch_update_grouped(&batch).await.unwrap();

        let cat = entry(&terms, "cat").await;
        assert_eq!(cat.document_frequency, 2);
        assert_eq!(cat.total_occurrences, 3);
        let dog = entry(&terms, "dog").await;
        assert_eq!(dog.document_frequency, 1);

        assert!(documents.indexed_at(&doc_a).is_some());
        assert!(documents.indexed_at(&doc_b).is_some());
    }

    #[tokio::test]
    async fn test_batch_update_grouped_is_idempotent() {
        let (indexer, terms, _) = indexer();
        let batch = vec![
            (DocumentId::from("doc-a"), frequencies(&[("cat", 2)])),
            (
                DocumentId::from("doc-b"),
                frequencies(&[("cat", 1), ("dog", 1)]),
            ),
        ];

        indexer.batch_update_grouped(&batch).await.unwrap();
        indexer.batch_update_grouped(&batch).await.unwrap();

        let cat = entry(&terms, "cat").await;
        assert_eq!(cat.postings.len(), 2);
        assert_eq!(cat.document_frequency, 2);
        assert_eq!(cat.total_occurrences, 3);

        let dog = entry(&terms, "dog").await;
        assert_eq!(dog.postings.len(), 1);
        assert_eq!(dog.document_frequency, 1);
        assert_eq!(dog.total_occurrences, 1);
    }

    #[tokio::test]
    async fn test_batch_insert_deduplicates_pairs() {
        let (indexer, terms, _) = indexer();
        let doc = DocumentId::from("doc-a");
        let batch = vec![
            (doc.clone(), frequencies(&[("cat", 2)])),
            (doc.clone(), frequencies(&[("cat", 7)])),
        ];
        indexer.batch_insert(&batch).await.unwrap();

        let cat = entry(&terms, "cat").await;
        assert_eq!(cat.postings.len(), 1);
        assert_eq!(cat.total_occurrences, 7);
    }

    #[tokio::test]
    async fn test_mark_indexed_empty_is_noop() {
        let (indexer, _, _) = indexer();
        indexer.mark_indexed(&[]).await.unwrap();
    }
}
