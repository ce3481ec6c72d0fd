//! # Calla
//!
//! A lightweight TF-IDF full-text search engine for Rust.
//!
//! ## Features
//!
//! - Text analysis pipeline (tokenizer, stopword filter, suffix-stripping stemmer)
//! - Incremental and batched inverted-index maintenance
//! - Configurable query parsing
//! - Classic TF-IDF ranking
//! - Prefix autocomplete backed by a TTL cache
//! - Asynchronous batch-indexing queue and worker
//!
//! Persistence and caching are abstractions: the engine talks to a term
//! store, a document store, and a key-value cache through traits in
//! [`storage`], with in-memory backends provided for tests and embedded use.

pub mod analysis;
pub mod cache;
mod engine;
mod error;
pub mod index;
pub mod query;
pub mod search;
pub mod storage;

// Re-exports for the public API
pub use analysis::stemmer::PorterStemmer;
pub use analysis::stopwords::StopwordProvider;
pub use analysis::token::Token;
pub use analysis::tokenizer::Tokenizer;
pub use engine::{Engine, EngineConfig};
pub use error::{CallaError, Result};
pub use index::worker::WorkerConfig;
pub use index::{DocumentId, InvertedIndexTerm, Posting, TermFrequencies};
pub use query::config::QueryParserConfig;
pub use query::parser::{QueryParser, QueryRepresentation};
pub use search::matcher::{DocumentScore, TermMatch};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
