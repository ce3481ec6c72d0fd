//! Buffer between document ingestion and the batch indexer.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;

use crate::index::{DocumentId, TermFrequencies};

/// A document's term frequencies, buffered until the next batch flush.
///
/// Created at enqueue time and discarded once the worker commits (or
/// drops) the batch containing it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueItem {
    /// The uploaded document.
    pub document_id: DocumentId,

    /// Term → occurrence count extracted from the document.
    pub term_frequencies: TermFrequencies,
}

/// Unbounded multi-producer/single-consumer buffer of [`QueueItem`]s.
///
/// `enqueue` never blocks the caller and never fails; the worker drains
/// everything currently buffered once per interval. The next scheduled
/// flush time is observable for client-facing "next batch" status.
pub struct IndexingQueue {
    sender: mpsc::UnboundedSender<QueueItem>,
    receiver: Mutex<mpsc::UnboundedReceiver<QueueItem>>,
    next_batch_time: RwLock<Option<DateTime<Utc>>>,
}

impl IndexingQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        IndexingQueue {
            sender,
            receiver: Mutex::new(receiver),
            next_batch_time: RwLock::new(None),
        }
    }

    /// Buffer a document for the next batch flush.
    pub fn enqueue<D: Into<DocumentId>>(&self, document_id: D, term_frequencies: TermFrequencies) {
        // The receiver lives as long as the queue, so the send cannot fail.
        let _ = self.sender.send(QueueItem {
            document_id: document_id.into(),
            term_frequencies,
        });
    }

    /// Remove and return every item currently buffered.
    pub fn drain(&self) -> Vec<QueueItem> {
        let mut receiver = self.receiver.lock();
        let mut items = Vec::new();
        while let Ok(item) = receiver.try_recv() {
            items.push(item);
        }
        items
    }

    /// When the worker will next flush the queue.
    pub fn next_batch_time(&self) -> Option<DateTime<Utc>> {
        *self.next_batch_time.read()
    }

    pub(crate) fn set_next_batch_time(&self, at: Option<DateTime<Utc>>) {
        *self.next_batch_time.write() = at;
    }
}

impl Default for IndexingQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for IndexingQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexingQueue")
            .field("next_batch_time", &self.next_batch_time())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frequencies(term: &str, tf: u32) -> TermFrequencies {
        [(term.to_string(), tf)].into_iter().collect()
    }

    #[test]
    fn test_enqueue_and_drain_in_order() {
        let queue = IndexingQueue::new();
        queue.enqueue("doc-1", frequencies("cat", 2));
        queue.enqueue("doc-2", frequencies("dog", 1));

        let items = queue.drain();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].document_id, DocumentId::from("doc-1"));
        assert_eq!(items[1].document_id, DocumentId::from("doc-2"));
    }

    #[test]
    fn test_drain_empties_the_queue() {
        let queue = IndexingQueue::new();
        queue.enqueue("doc-1", frequencies("cat", 2));

        assert_eq!(queue.drain().len(), 1);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_next_batch_time_observable() {
        let queue = IndexingQueue::new();
        assert!(queue.next_batch_time().is_none());

        let at = Utc::now();
        queue.set_next_batch_time(Some(at));
        assert_eq!(queue.next_batch_time(), Some(at));
    }
}
