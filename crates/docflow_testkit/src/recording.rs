//! A store wrapper that records when operations reach the client.

use docflow_core::{
    DocumentRef, DocumentSnapshot, DocumentStore, MetadataChanges, Query, QuerySnapshot,
    SnapshotStream, StoreResult, Transaction, WriteBatch,
};
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Forwards every call to `S`, recording the instant each transaction
/// attempt starts and the size of each committed batch.
///
/// Instants come from `tokio::time`, so under a paused clock the gaps
/// between attempts measure the backoff exactly.
pub struct RecordingStore<S> {
    inner: S,
    attempts: Mutex<Vec<Instant>>,
    commits: Mutex<Vec<usize>>,
}

impl<S> RecordingStore<S> {
    /// Wraps `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            attempts: Mutex::new(Vec::new()),
            commits: Mutex::new(Vec::new()),
        }
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns the number of transaction attempts seen.
    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().len()
    }

    /// Returns the delay between each pair of consecutive attempts.
    pub fn attempt_gaps(&self) -> Vec<Duration> {
        self.attempts
            .lock()
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .collect()
    }

    /// Returns the number of writes in each batch committed so far.
    pub fn committed_batch_sizes(&self) -> Vec<usize> {
        self.commits.lock().clone()
    }
}

impl<S: DocumentStore> DocumentStore for RecordingStore<S> {
    async fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        self.commits.lock().push(batch.len());
        self.inner.commit(batch).await
    }

    async fn run_transaction<T, F>(&self, work: &mut F) -> StoreResult<T>
    where
        T: Send,
        F: FnMut(&mut dyn Transaction) -> StoreResult<T> + Send,
    {
        self.attempts.lock().push(Instant::now());
        self.inner.run_transaction(work).await
    }

    async fn get_document(&self, doc: &DocumentRef) -> StoreResult<DocumentSnapshot> {
        self.inner.get_document(doc).await
    }

    async fn get_query(&self, query: &Query) -> StoreResult<QuerySnapshot> {
        self.inner.get_query(query).await
    }

    fn listen_document(
        &self,
        doc: &DocumentRef,
        changes: MetadataChanges,
    ) -> SnapshotStream<DocumentSnapshot> {
        self.inner.listen_document(doc, changes)
    }

    fn listen_query(&self, query: &Query, changes: MetadataChanges) -> SnapshotStream<QuerySnapshot> {
        self.inner.listen_query(query, changes)
    }
}
