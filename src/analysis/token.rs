//! Token representation produced by the tokenizer.

use serde::{Deserialize, Serialize};

/// A single word token together with its position in the source text.
///
/// `position` is the token's ordinal index in the token stream (the first
/// surviving fragment is 0, the second 1, and so on), not a byte offset.
/// Tokens are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The token text, already stemmed by the tokenizer.
    pub text: String,

    /// Zero-based ordinal position within the source text.
    pub position: usize,
}

impl Token {
    /// Create a new token.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
        }
    }
}
