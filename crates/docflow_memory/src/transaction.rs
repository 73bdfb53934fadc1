//! Optimistic transaction handle.

use crate::state::{ReadSet, StoreState};
use docflow_core::{
    DocumentRef, DocumentSnapshot, FieldMap, SetOptions, StoreError, StoreResult, Transaction,
    WriteBatch,
};
use parking_lot::RwLock;

/// One transaction attempt against a [`MemoryStore`](crate::MemoryStore).
///
/// Reads go straight to the store and record the version they observed.
/// Writes are buffered and applied at commit, after the recorded versions
/// are checked.
pub(crate) struct MemoryTransaction<'a> {
    state: &'a RwLock<StoreState>,
    reads: ReadSet,
    writes: WriteBatch,
}

impl<'a> MemoryTransaction<'a> {
    pub(crate) fn new(state: &'a RwLock<StoreState>) -> Self {
        Self {
            state,
            reads: ReadSet::new(),
            writes: WriteBatch::new(),
        }
    }

    pub(crate) fn into_parts(self) -> (ReadSet, WriteBatch) {
        (self.reads, self.writes)
    }
}

impl Transaction for MemoryTransaction<'_> {
    fn get(&mut self, doc: &DocumentRef) -> StoreResult<DocumentSnapshot> {
        if !self.writes.is_empty() {
            return Err(StoreError::invalid_argument(
                "transactions require all reads to be executed before all writes",
            ));
        }
        let state = self.state.read();
        self.reads
            .entry(doc.path().to_string())
            .or_insert_with(|| state.version_of(doc.path()));
        Ok(state.snapshot(doc))
    }

    fn set(&mut self, doc: &DocumentRef, data: FieldMap, options: SetOptions) -> StoreResult<()> {
        self.writes.set_with_options(doc.clone(), data, options);
        Ok(())
    }

    fn update(&mut self, doc: &DocumentRef, fields: FieldMap) -> StoreResult<()> {
        self.writes.update(doc.clone(), fields);
        Ok(())
    }

    fn delete(&mut self, doc: &DocumentRef) -> StoreResult<()> {
        self.writes.delete(doc.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docflow_core::{ErrorCode, WriteOp};
    use serde_json::json;

    #[test]
    fn reads_record_versions_and_writes_buffer() {
        let state = RwLock::new(StoreState::default());
        state
            .write()
            .apply(vec![WriteOp::Set {
                doc: DocumentRef::new("c/1"),
                data: json!({"n": 1}).as_object().cloned().unwrap(),
                options: SetOptions::Overwrite,
            }])
            .unwrap();

        let mut txn = MemoryTransaction::new(&state);
        let snapshot = txn.get(&DocumentRef::new("c/1")).unwrap();
        let missing = txn.get(&DocumentRef::new("c/2")).unwrap();
        txn.delete(&DocumentRef::new("c/1")).unwrap();

        assert_eq!(snapshot.get("n"), Some(&json!(1)));
        assert!(!missing.exists());
        assert!(state.read().docs().contains_key("c/1"));

        let (reads, writes) = txn.into_parts();
        assert_eq!(reads.get("c/1"), Some(&1));
        assert_eq!(reads.get("c/2"), Some(&0));
        assert_eq!(writes.len(), 1);
    }

    #[test]
    fn read_after_write_is_rejected() {
        let state = RwLock::new(StoreState::default());
        let mut txn = MemoryTransaction::new(&state);

        txn.set(&DocumentRef::new("c/1"), FieldMap::new(), SetOptions::Overwrite)
            .unwrap();
        let err = txn.get(&DocumentRef::new("c/1")).unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }
}
