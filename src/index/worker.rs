//! Background task flushing the indexing queue on a schedule.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, error, info};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::index::indexer::Indexer;
use crate::index::queue::IndexingQueue;
use crate::index::{DocumentId, TermFrequencies};

/// Configuration for the batch index worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Time between batch flushes.
    pub interval: Duration,

    /// Upper bound on a single batch commit. A commit that exceeds it is
    /// treated like any other failed batch: logged and dropped.
    pub batch_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        WorkerConfig {
            interval: Duration::from_secs(60 * 60),
            batch_timeout: Duration::from_secs(300),
        }
    }
}

/// Single long-running task that drains the queue once per interval and
/// commits the drained batch through the grouped indexer path.
///
/// Failed or timed-out batches are logged and dropped; the affected
/// documents stay unstamped until a future re-index. The loop itself
/// never stops on a batch error.
pub struct IndexWorker {
    queue: Arc<IndexingQueue>,
    indexer: Arc<Indexer>,
    config: WorkerConfig,
}

impl IndexWorker {
    /// Create a worker over the given queue and indexer.
    pub fn new(queue: Arc<IndexingQueue>, indexer: Arc<Indexer>, config: WorkerConfig) -> Self {
        IndexWorker {
            queue,
            indexer,
            config,
        }
    }

    /// Spawn the worker loop onto the current tokio runtime.
    pub fn spawn(self) -> WorkerHandle {
        let (shutdown_sender, shutdown_receiver) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_receiver));
        WorkerHandle {
            shutdown: shutdown_sender,
            task,
        }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "batch index worker started (interval {:?})",
            self.config.interval
        );
        loop {
            let next = Utc::now() + chrono::Duration::seconds(self.config.interval.as_secs() as i64);
            self.queue.set_next_batch_time(Some(next));

            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                _ = shutdown.changed() => break,
            }

            // An in-flight commit is allowed to finish; shutdown is only
            // observed while waiting on the interval.
            self.flush().await;
        }
        self.queue.set_next_batch_time(None);
        info!("batch index worker stopped");
    }

    async fn flush(&self) {
        let batch = self.queue.drain();
        if batch.is_empty() {
            debug!("no queued documents, skipping batch");
            return;
        }

        info!("processing batch of {} document(s)", batch.len());
        let documents: Vec<(DocumentId, TermFrequencies)> = batch
            .into_iter()
            .map(|item| (item.document_id, item.term_frequencies))
            .collect();

        let commit = self.indexer.batch_update_grouped(&documents);
        match tokio::time::timeout(self.config.batch_timeout, commit).await {
            Ok(Ok(())) => info!("finished processing batch"),
            Ok(Err(e)) => error!("batch commit failed, dropping batch: {e}"),
            Err(_) => error!(
                "batch commit exceeded {:?}, dropping batch",
                self.config.batch_timeout
            ),
        }
    }
}

/// Handle to a spawned [`IndexWorker`].
pub struct WorkerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    /// Signal the worker to stop and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

impl std::fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerHandle").finish()
    }
}
