//! Engine facade wiring the analysis, query, index, and search components.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::warn;

use crate::analysis::stemmer::PorterStemmer;
use crate::analysis::stopwords::StopwordProvider;
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;
use crate::index::indexer::Indexer;
use crate::index::queue::IndexingQueue;
use crate::index::worker::{IndexWorker, WorkerConfig, WorkerHandle};
use crate::index::{DocumentId, TermFrequencies};
use crate::query::config::QueryParserConfig;
use crate::query::parser::QueryParser;
use crate::search::autocomplete::AutocompleteResolver;
use crate::search::matcher::{DocumentScore, Matcher};
use crate::storage::{Cache, DocumentStore, TermStore};

/// Configuration for [`Engine`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Query parser configuration.
    pub parser: QueryParserConfig,

    /// Batch worker configuration.
    pub worker: WorkerConfig,

    /// Optional stopword file; the built-in list is used when absent.
    pub stopword_file: Option<PathBuf>,
}

/// The search engine core.
///
/// Wires the shared stemmer and stopword provider into the query parser,
/// resolver, and matcher, owns the indexing queue, and runs the batch
/// worker in the background. Construction must happen inside a tokio
/// runtime because the worker task is spawned immediately.
pub struct Engine {
    queue: Arc<IndexingQueue>,
    indexer: Arc<Indexer>,
    resolver: Arc<AutocompleteResolver>,
    matcher: Matcher,
    tokenizer: Tokenizer,
    stemmer: Arc<PorterStemmer>,
    stopwords: Arc<StopwordProvider>,
    documents: Arc<dyn DocumentStore>,
    worker: Option<WorkerHandle>,
}

impl Engine {
    /// Create an engine over the given stores and cache.
    ///
    /// Fails when the parser configuration does not validate.
    pub fn new(
        terms: Arc<dyn TermStore>,
        documents: Arc<dyn DocumentStore>,
        cache: Arc<dyn Cache>,
        config: EngineConfig,
    ) -> Result<Self> {
        let stemmer = Arc::new(PorterStemmer::new());
        let stopwords = Arc::new(match &config.stopword_file {
            Some(path) => StopwordProvider::from_file(path.clone()),
            None => StopwordProvider::new(),
        });

        let parser = Arc::new(QueryParser::new(
            config.parser,
            stemmer.clone(),
            stopwords.clone(),
        )?);
        let tokenizer = Tokenizer::new(stemmer.clone());
        let resolver = Arc::new(AutocompleteResolver::new(
            terms.clone(),
            cache,
            stopwords.clone(),
        ));
        let matcher = Matcher::new(parser, resolver.clone(), documents.clone());
        let indexer = Arc::new(Indexer::new(terms, documents.clone()));
        let queue = Arc::new(IndexingQueue::new());
        let worker =
            IndexWorker::new(queue.clone(), indexer.clone(), config.worker).spawn();

        Ok(Engine {
            queue,
            indexer,
            resolver,
            matcher,
            tokenizer,
            stemmer,
            stopwords,
            documents,
            worker: Some(worker),
        })
    }

    /// Buffer a document's term frequencies for the next batch flush.
    /// Never blocks and never fails.
    pub fn enqueue<D: Into<DocumentId>>(&self, document_id: D, term_frequencies: TermFrequencies) {
        self.queue.enqueue(document_id, term_frequencies);
    }

    /// Extract term frequencies from raw document text and buffer them for
    /// the next batch flush.
    ///
    /// Runs the same pipeline as query parsing (tokenize, drop stopwords,
    /// stem), so indexed terms line up with parsed query terms.
    pub fn enqueue_text<D: Into<DocumentId>>(&self, document_id: D, text: &str) {
        let stopwords = self.stopwords.stopwords();
        let mut term_frequencies = TermFrequencies::default();
        for token in self.tokenizer.tokenize_raw(text) {
            if stopwords.contains(&token.text) {
                continue;
            }
            let term = self.stemmer.stem(&token.text);
            *term_frequencies.entry(term).or_insert(0) += 1;
        }
        self.enqueue(document_id, term_frequencies);
    }

    /// Autocomplete suggestions for a prefix (at most ten).
    pub async fn suggest(&self, prefix: &str) -> Result<Vec<String>> {
        self.resolver.suggest_by_prefix(prefix).await
    }

    /// Rank all documents matching a query, best first.
    pub async fn rank(&self, query: &str) -> Result<Vec<DocumentScore>> {
        self.matcher.rank(query).await
    }

    /// When the worker will next flush the queue.
    pub fn next_batch_time(&self) -> Option<DateTime<Utc>> {
        self.queue.next_batch_time()
    }

    /// Total number of documents in the document store.
    pub async fn document_count(&self) -> Result<u64> {
        self.documents.count().await
    }

    /// Immediately run the grouped batch path for the given documents,
    /// bypassing the queue. Intended for administrative re-indexing of
    /// documents that missed a batch.
    pub async fn force_reindex(&self, documents: &[(DocumentId, TermFrequencies)]) -> Result<()> {
        self.indexer.batch_update_grouped(documents).await
    }

    /// Re-read the stopword source. A failed reload keeps the current set.
    pub fn reload_stopwords(&self) {
        if let Err(e) = self.stopwords.reload() {
            warn!("stopword reload failed, keeping current set: {e}");
        }
    }

    /// The tokenizer shared with the indexing side.
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Stop the background worker, letting an in-flight batch finish.
    pub async fn shutdown(mut self) {
        if let Some(worker) = self.worker.take() {
            worker.shutdown().await;
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("next_batch_time", &self.next_batch_time())
            .finish()
    }
}
