//! Reloadable stopword provider.
//!
//! The stopword set is held as an immutable snapshot behind an `Arc`.
//! `reload` builds a complete replacement set and swaps the pointer under a
//! short write lock, so concurrent readers always observe either the old or
//! the new set, never a partially built one.

use std::path::PathBuf;
use std::sync::Arc;

use ahash::AHashSet;
use lazy_static::lazy_static;
use log::warn;
use parking_lot::RwLock;

use crate::error::Result;

const EMBEDDED_STOPWORDS: &str = include_str!("stopwords.txt");

lazy_static! {
    static ref DEFAULT_STOPWORDS: Arc<AHashSet<String>> =
        Arc::new(parse_stopwords(EMBEDDED_STOPWORDS));
}

/// Supplies the stopword set consumed by the query parser and the
/// autocomplete resolver.
///
/// Instances are meant to be injected (`Arc<StopwordProvider>`) into every
/// consumer rather than accessed through process-wide state, so the reload
/// lifecycle stays explicit.
pub struct StopwordProvider {
    source: Option<PathBuf>,
    snapshot: RwLock<Arc<AHashSet<String>>>,
}

impl StopwordProvider {
    /// Create a provider backed by the built-in English stopword list.
    pub fn new() -> Self {
        StopwordProvider {
            source: None,
            snapshot: RwLock::new(DEFAULT_STOPWORDS.clone()),
        }
    }

    /// Create a provider backed by a stopword file: one word per line,
    /// `#` starts a comment.
    ///
    /// Falls back to the built-in list when the file cannot be read, so
    /// construction never fails.
    pub fn from_file<P: Into<PathBuf>>(path: P) -> Self {
        let provider = StopwordProvider {
            source: Some(path.into()),
            snapshot: RwLock::new(DEFAULT_STOPWORDS.clone()),
        };
        if let Err(e) = provider.reload() {
            warn!("failed to load stopword file, using built-in list: {e}");
        }
        provider
    }

    /// A snapshot of the current stopword set. All entries are lowercase.
    pub fn stopwords(&self) -> Arc<AHashSet<String>> {
        self.snapshot.read().clone()
    }

    /// Case-insensitive membership test.
    pub fn is_stopword(&self, word: &str) -> bool {
        if word.is_empty() {
            return false;
        }
        let snapshot = self.stopwords();
        snapshot.contains(word) || snapshot.contains(word.to_lowercase().as_str())
    }

    /// Re-read the source of truth and swap in the new set atomically.
    ///
    /// On failure the current snapshot is kept and the error is returned;
    /// the provider is never left without a usable set.
    pub fn reload(&self) -> Result<()> {
        let next = match &self.source {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                let parsed = parse_stopwords(&content);
                if parsed.is_empty() {
                    DEFAULT_STOPWORDS.clone()
                } else {
                    Arc::new(parsed)
                }
            }
            None => DEFAULT_STOPWORDS.clone(),
        };
        *self.snapshot.write() = next;
        Ok(())
    }
}

impl Default for StopwordProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StopwordProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopwordProvider")
            .field("source", &self.source)
            .field("len", &self.snapshot.read().len())
            .finish()
    }
}

fn parse_stopwords(content: &str) -> AHashSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_list() {
        let provider = StopwordProvider::new();
        assert!(provider.stopwords().len() >= 100);
        assert!(provider.is_stopword("the"));
        assert!(provider.is_stopword("The"));
        assert!(provider.is_stopword("AND"));
        assert!(!provider.is_stopword("search"));
        assert!(!provider.is_stopword(""));
    }

    #[test]
    fn test_snapshot_is_lowercase() {
        let provider = StopwordProvider::new();
        assert!(provider.stopwords().iter().all(|w| w == &w.to_lowercase()));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# custom list").unwrap();
        writeln!(file, "Foo").unwrap();
        writeln!(file, "bar").unwrap();
        file.flush().unwrap();

        let provider = StopwordProvider::from_file(file.path());
        assert!(provider.is_stopword("foo"));
        assert!(provider.is_stopword("BAR"));
        assert!(!provider.is_stopword("the"));
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let provider = StopwordProvider::from_file("/nonexistent/stopwords.txt");
        assert!(provider.is_stopword("the"));
    }

    #[test]
    fn test_reload_picks_up_changes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alpha").unwrap();
        file.flush().unwrap();

        let provider = StopwordProvider::from_file(file.path());
        assert!(provider.is_stopword("alpha"));
        assert!(!provider.is_stopword("beta"));

        writeln!(file, "beta").unwrap();
        file.flush().unwrap();

        provider.reload().unwrap();
        assert!(provider.is_stopword("beta"));
    }

    #[test]
    fn test_reload_failure_keeps_snapshot() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "alpha\n").unwrap();

        let provider = StopwordProvider::from_file(file.path());
        assert!(provider.is_stopword("alpha"));

        let path = file.path().to_path_buf();
        drop(file);
        assert!(provider.reload().is_err());
        assert!(provider.is_stopword("alpha"), "old snapshot kept after failed reload of {path:?}");
    }
}
