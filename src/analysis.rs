//! Text analysis module for Calla.
//!
//! This module provides the linguistic pipeline that both indexing and
//! query parsing run through:
//!
//! ```text
//! Text → Tokenizer → Tokens → Stopword Filter → Stemmer → Index/Query Terms
//! ```
//!
//! Indexing and search share the same pipeline so that query terms agree
//! with the terms stored in the inverted index.
//!
//! # Modules
//!
//! - [`token`]: Token representation
//! - [`tokenizer`]: Delimiter-based tokenization with per-token stemming
//! - [`stemmer`]: Rule-based suffix-stripping stemmer
//! - [`stopwords`]: Reloadable stopword provider

pub mod stemmer;
pub mod stopwords;
pub mod token;
pub mod tokenizer;

// Re-exports
pub use stemmer::PorterStemmer;
pub use stopwords::StopwordProvider;
pub use token::Token;
pub use tokenizer::Tokenizer;
