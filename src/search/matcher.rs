//! TF-IDF matching and ranking.

use std::cmp::Ordering;
use std::sync::Arc;

use ahash::AHashMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::{DocumentId, InvertedIndexTerm};
use crate::query::parser::QueryParser;
use crate::search::autocomplete::AutocompleteResolver;
use crate::storage::DocumentStore;

/// One matched term and its frequency within a scored document, merged
/// across postings of the same term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermMatch {
    /// The index term.
    pub term: String,

    /// Occurrences of the term in the document.
    pub frequency: u32,
}

/// A document's relevance for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentScore {
    /// The scored document.
    pub document_id: DocumentId,

    /// Aggregate TF-IDF score across all matched terms.
    pub score: f64,

    /// Which terms matched, and how often.
    pub matches: Vec<TermMatch>,
}

/// Computes TF-IDF scores per document for a parsed query.
///
/// Ranking runs parse → resolve terms → score → sort. The inverse document
/// frequency of a term is `log10(N / df)` over the total corpus size `N`;
/// every posting contributes `tf × idf` to its document's score.
pub struct Matcher {
    parser: Arc<QueryParser>,
    resolver: Arc<AutocompleteResolver>,
    documents: Arc<dyn DocumentStore>,
}

impl Matcher {
    /// Create a matcher.
    pub fn new(
        parser: Arc<QueryParser>,
        resolver: Arc<AutocompleteResolver>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Matcher {
            parser,
            resolver,
            documents,
        }
    }

    /// Rank all documents matching `input`, best first.
    pub async fn rank(&self, input: &str) -> Result<Vec<DocumentScore>> {
        let query = self.parser.parse(input)?;
        let terms = self.resolver.resolve_query_terms(&query).await?;
        if terms.is_empty() {
            debug!("no index terms matched query, returning empty result");
            return Ok(Vec::new());
        }

        let total_documents = self.documents.count().await?;
        Ok(score_documents(&terms, total_documents))
    }
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher").finish()
    }
}

/// Score and sort the documents covered by the resolved terms.
///
/// Equal scores tie-break on the total matched frequency, so that with a
/// degenerate idf of zero the document with more occurrences still ranks
/// first.
fn score_documents(terms: &[InvertedIndexTerm], total_documents: u64) -> Vec<DocumentScore> {
    let mut by_document: AHashMap<DocumentId, DocumentScore> = AHashMap::new();

    for term in terms {
        if term.document_frequency == 0 {
            continue;
        }
        let idf = (total_documents as f64 / term.document_frequency as f64).log10();
        for posting in &term.postings {
            let contribution = posting.term_frequency as f64 * idf;
            let entry = by_document
                .entry(posting.document_id.clone())
                .or_insert_with(|| DocumentScore {
                    document_id: posting.document_id.clone(),
                    score: 0.0,
                    matches: Vec::new(),
                });
            entry.score += contribution;
            match entry.matches.iter_mut().find(|m| m.term == term.term) {
                Some(existing) => existing.frequency += posting.term_frequency,
                None => entry.matches.push(TermMatch {
                    term: term.term.clone(),
                    frequency: posting.term_frequency,
                }),
            }
        }
    }

    let mut scores: Vec<DocumentScore> = by_document.into_values().collect();
    scores.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| matched_frequency(b).cmp(&matched_frequency(a)))
    });
    scores
}

fn matched_frequency(score: &DocumentScore) -> u64 {
    score.matches.iter().map(|m| m.frequency as u64).sum()
}
