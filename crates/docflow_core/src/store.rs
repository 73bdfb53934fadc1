//! The document store client contract.
//!
//! These traits describe what this crate needs from the underlying
//! document-database client. The client owns networking, consistency,
//! storage and query execution; this crate only forwards calls and wraps
//! their outcomes.

use crate::config::MetadataChanges;
use crate::error::StoreResult;
use crate::query::Query;
use crate::types::{DocumentRef, DocumentSnapshot, FieldMap, QuerySnapshot, SetOptions};
use futures_util::Stream;
use std::future::Future;
use std::pin::Pin;

/// A push subscription to snapshots.
///
/// The stream yields a snapshot every time the observed target changes.
/// An `Err` item is terminal: the client yields nothing after it.
pub type SnapshotStream<T> = Pin<Box<dyn Stream<Item = StoreResult<T>> + Send>>;

/// A single staged write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Create or replace (or merge into) a document.
    Set {
        /// Target document.
        doc: DocumentRef,
        /// Field values to write.
        data: FieldMap,
        /// Overwrite or merge.
        options: SetOptions,
    },
    /// Update fields of an existing document.
    Update {
        /// Target document.
        doc: DocumentRef,
        /// Field paths and their new values.
        fields: FieldMap,
    },
    /// Delete a document.
    Delete {
        /// Target document.
        doc: DocumentRef,
    },
}

impl WriteOp {
    /// Returns the document this write targets.
    pub fn target(&self) -> &DocumentRef {
        match self {
            WriteOp::Set { doc, .. } | WriteOp::Update { doc, .. } | WriteOp::Delete { doc } => {
                doc
            }
        }
    }
}

/// Writes staged for one atomic commit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a set that replaces the document.
    pub fn set(&mut self, doc: DocumentRef, data: FieldMap) -> &mut Self {
        self.set_with_options(doc, data, SetOptions::Overwrite)
    }

    /// Stages a set with explicit options.
    pub fn set_with_options(
        &mut self,
        doc: DocumentRef,
        data: FieldMap,
        options: SetOptions,
    ) -> &mut Self {
        self.ops.push(WriteOp::Set { doc, data, options });
        self
    }

    /// Stages a partial update.
    pub fn update(&mut self, doc: DocumentRef, fields: FieldMap) -> &mut Self {
        self.ops.push(WriteOp::Update { doc, fields });
        self
    }

    /// Stages a delete.
    pub fn delete(&mut self, doc: DocumentRef) -> &mut Self {
        self.ops.push(WriteOp::Delete { doc });
        self
    }

    /// Returns the staged writes in order.
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Consumes the batch and returns the staged writes.
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    /// Returns the number of staged writes.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true if nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// A handle scoping reads and writes to one atomic attempt.
///
/// All reads must happen before any write. Writes become visible only if
/// the surrounding attempt commits.
pub trait Transaction: Send {
    /// Reads a document.
    fn get(&mut self, doc: &DocumentRef) -> StoreResult<DocumentSnapshot>;

    /// Stages a set.
    fn set(&mut self, doc: &DocumentRef, data: FieldMap, options: SetOptions) -> StoreResult<()>;

    /// Stages a partial update. Commit fails if the document does not exist.
    fn update(&mut self, doc: &DocumentRef, fields: FieldMap) -> StoreResult<()>;

    /// Stages a delete.
    fn delete(&mut self, doc: &DocumentRef) -> StoreResult<()>;
}

/// A document-database client.
pub trait DocumentStore: Send + Sync {
    /// Commits every write in `batch` atomically.
    ///
    /// On failure none of the writes take effect.
    fn commit(&self, batch: WriteBatch) -> impl Future<Output = StoreResult<()>> + Send;

    /// Runs `work` inside one atomic transaction attempt.
    ///
    /// Failures of the attempt (including conflicts detected at commit) are
    /// returned to the caller; the client does not retry on its own.
    fn run_transaction<T, F>(&self, work: &mut F) -> impl Future<Output = StoreResult<T>> + Send
    where
        T: Send,
        F: FnMut(&mut dyn Transaction) -> StoreResult<T> + Send;

    /// Reads a single document.
    fn get_document(
        &self,
        doc: &DocumentRef,
    ) -> impl Future<Output = StoreResult<DocumentSnapshot>> + Send;

    /// Executes a query once.
    fn get_query(&self, query: &Query) -> impl Future<Output = StoreResult<QuerySnapshot>> + Send;

    /// Updates fields of an existing document.
    fn update(
        &self,
        doc: &DocumentRef,
        fields: FieldMap,
    ) -> impl Future<Output = StoreResult<()>> + Send {
        let mut batch = WriteBatch::new();
        batch.update(doc.clone(), fields);
        self.commit(batch)
    }

    /// Subscribes to a document.
    fn listen_document(
        &self,
        doc: &DocumentRef,
        changes: MetadataChanges,
    ) -> SnapshotStream<DocumentSnapshot>;

    /// Subscribes to a query.
    fn listen_query(&self, query: &Query, changes: MetadataChanges) -> SnapshotStream<QuerySnapshot>;
}
