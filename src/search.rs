//! Search-side components.
//!
//! # Modules
//!
//! - [`autocomplete`]: Prefix suggestions and query-term resolution
//! - [`matcher`]: TF-IDF scoring and ranking

pub mod autocomplete;
pub mod matcher;

pub use autocomplete::AutocompleteResolver;
pub use matcher::{DocumentScore, Matcher, TermMatch};
