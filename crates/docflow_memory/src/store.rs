//! The in-memory document store.

use crate::config::MemoryStoreConfig;
use crate::listeners::Listeners;
use crate::state::{ReadSet, StoreState};
use crate::transaction::MemoryTransaction;
use docflow_core::{
    DocumentRef, DocumentSnapshot, DocumentStore, ErrorCode, FieldMap, MetadataChanges, Query,
    QuerySnapshot, SnapshotStream, StoreError, StoreResult, Transaction, WriteBatch, WriteOp,
};
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Default)]
struct Faults {
    commits: VecDeque<ErrorCode>,
    transactions: VecDeque<ErrorCode>,
}

struct Inner {
    config: MemoryStoreConfig,
    // Lock order: `state` before `listeners`.
    state: RwLock<StoreState>,
    listeners: Mutex<Listeners>,
    faults: Mutex<Faults>,
    transaction_attempts: AtomicU64,
}

/// A [`DocumentStore`] holding every document in memory.
///
/// Commits are atomic and serialized. Transactions are optimistic: reads
/// record the version they saw and the commit aborts if any of those
/// documents changed. Listeners receive the current snapshot when they
/// subscribe and a new one after every commit that touches them.
///
/// Cloning is cheap; clones share the same documents.
///
/// # Example
///
/// ```rust
/// use docflow_core::{DocumentExt, DocumentRef};
/// use docflow_memory::MemoryStore;
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = MemoryStore::new();
/// let doc = DocumentRef::new("users/ana");
/// store.seed(&doc, json!({"name": "Ana"}).as_object().cloned().unwrap());
///
/// let snapshot = store.get_snapshot(&doc).await;
/// assert!(snapshot.value().is_some_and(|s| s.exists()));
/// # }
/// ```
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MemoryStoreConfig::default())
    }

    /// Creates an empty store.
    #[must_use]
    pub fn with_config(config: MemoryStoreConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                state: RwLock::new(StoreState::default()),
                listeners: Mutex::new(Listeners::default()),
                faults: Mutex::new(Faults::default()),
                transaction_attempts: AtomicU64::new(0),
            }),
        }
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &MemoryStoreConfig {
        &self.inner.config
    }

    /// Writes a document directly, bypassing injected failures.
    pub fn seed(&self, doc: &DocumentRef, data: FieldMap) {
        let op = WriteOp::Set {
            doc: doc.clone(),
            data,
            options: Default::default(),
        };
        // A plain set cannot fail.
        let _ = self.inner.apply(vec![op], None);
    }

    /// Returns the stored fields of a document.
    pub fn document(&self, doc: &DocumentRef) -> Option<FieldMap> {
        self.inner
            .state
            .read()
            .docs()
            .get(doc.path())
            .map(|stored| stored.data.clone())
    }

    /// Returns the number of stored documents.
    pub fn len(&self) -> usize {
        self.inner.state.read().docs().len()
    }

    /// Returns true if no document is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().active()
    }

    /// Returns how many transaction attempts have started.
    pub fn transaction_attempts(&self) -> u64 {
        self.inner.transaction_attempts.load(Ordering::SeqCst)
    }

    /// Fails every current listener with `code`, ending their streams.
    pub fn fail_listeners(&self, code: ErrorCode) {
        let error = StoreError::client(code, "listener failed");
        debug!(%code, "failing all listeners");
        self.inner.listeners.lock().fail_all(&error);
    }

    /// Makes the next `count` batch commits fail with `code`.
    pub fn fail_next_commits(&self, count: usize, code: ErrorCode) {
        let mut faults = self.inner.faults.lock();
        faults.commits.extend(std::iter::repeat(code).take(count));
    }

    /// Makes the next `count` transaction attempts fail with `code` at
    /// commit, after the unit of work has run.
    pub fn fail_next_transactions(&self, count: usize, code: ErrorCode) {
        let mut faults = self.inner.faults.lock();
        faults.transactions.extend(std::iter::repeat(code).take(count));
    }

    async fn round_trip(&self) {
        let latency = self.inner.config.latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

impl Inner {
    /// Applies `ops` atomically, validating `reads` first when given.
    fn apply(&self, ops: Vec<WriteOp>, reads: Option<&ReadSet>) -> StoreResult<()> {
        let mut state = self.state.write();
        if let Some(reads) = reads {
            state.check_reads(reads)?;
        }
        let touched = state.apply(ops)?;
        trace!(writes = touched.len(), "commit applied");
        self.listeners.lock().notify(&touched, &state);
        Ok(())
    }

    fn take_commit_fault(&self) -> Option<StoreError> {
        let code = self.faults.lock().commits.pop_front()?;
        Some(StoreError::client(code, "injected commit failure"))
    }

    fn take_transaction_fault(&self) -> Option<StoreError> {
        let code = self.faults.lock().transactions.pop_front()?;
        Some(StoreError::client(code, "injected transaction failure"))
    }
}

impl DocumentStore for MemoryStore {
    async fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        self.round_trip().await;
        if let Some(err) = self.inner.take_commit_fault() {
            debug!(error = %err, "commit rejected");
            return Err(err);
        }
        self.inner.apply(batch.into_ops(), None)
    }

    async fn run_transaction<T, F>(&self, work: &mut F) -> StoreResult<T>
    where
        T: Send,
        F: FnMut(&mut dyn Transaction) -> StoreResult<T> + Send,
    {
        self.round_trip().await;
        self.inner.transaction_attempts.fetch_add(1, Ordering::SeqCst);

        let mut txn = MemoryTransaction::new(&self.inner.state);
        let value = work(&mut txn)?;
        let (reads, writes) = txn.into_parts();

        if let Some(err) = self.inner.take_transaction_fault() {
            debug!(error = %err, "transaction rejected");
            return Err(err);
        }
        let reads = self.inner.config.validate_transaction_reads.then_some(&reads);
        self.inner.apply(writes.into_ops(), reads)?;
        Ok(value)
    }

    async fn get_document(&self, doc: &DocumentRef) -> StoreResult<DocumentSnapshot> {
        self.round_trip().await;
        Ok(self.inner.state.read().snapshot(doc))
    }

    async fn get_query(&self, query: &Query) -> StoreResult<QuerySnapshot> {
        self.round_trip().await;
        self.inner.state.read().query(query)
    }

    // Metadata never changes on its own here, so both modes behave alike.
    fn listen_document(
        &self,
        doc: &DocumentRef,
        _changes: MetadataChanges,
    ) -> SnapshotStream<DocumentSnapshot> {
        let state = self.inner.state.read();
        self.inner.listeners.lock().add_document(doc.clone(), &state)
    }

    fn listen_query(&self, query: &Query, _changes: MetadataChanges) -> SnapshotStream<QuerySnapshot> {
        let state = self.inner.state.read();
        self.inner.listeners.lock().add_query(query.clone(), &state)
    }
}
