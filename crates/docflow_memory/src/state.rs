//! Versioned document table and atomic write application.

use crate::query::execute;
use crate::value::{deep_merge, get_path, set_path};
use docflow_core::{
    DocumentRef, DocumentSnapshot, FieldMap, Query, QuerySnapshot, SetOptions, StoreError,
    StoreResult, WriteOp,
};
use std::collections::BTreeMap;

/// A stored document and the commit version that last wrote it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StoredDocument {
    pub(crate) data: FieldMap,
    pub(crate) version: u64,
}

/// Versions observed by transaction reads, keyed by document path.
///
/// A missing document is recorded as version 0.
pub(crate) type ReadSet = BTreeMap<String, u64>;

#[derive(Debug, Default)]
pub(crate) struct StoreState {
    docs: BTreeMap<String, StoredDocument>,
    version: u64,
}

impl StoreState {
    pub(crate) fn docs(&self) -> &BTreeMap<String, StoredDocument> {
        &self.docs
    }

    pub(crate) fn version_of(&self, path: &str) -> u64 {
        self.docs.get(path).map_or(0, |doc| doc.version)
    }

    pub(crate) fn snapshot(&self, doc: &DocumentRef) -> DocumentSnapshot {
        match self.docs.get(doc.path()) {
            Some(stored) => DocumentSnapshot::existing(doc.clone(), stored.data.clone()),
            None => DocumentSnapshot::missing(doc.clone()),
        }
    }

    pub(crate) fn query(&self, query: &Query) -> StoreResult<QuerySnapshot> {
        execute(query, &self.docs).map(QuerySnapshot::new)
    }

    /// Fails with `aborted` if any document in `reads` was written since
    /// it was read.
    pub(crate) fn check_reads(&self, reads: &ReadSet) -> StoreResult<()> {
        for (path, &seen) in reads {
            if self.version_of(path) != seen {
                return Err(StoreError::aborted(format!(
                    "document {path} changed since it was read"
                )));
            }
        }
        Ok(())
    }

    /// Applies `ops` as one commit.
    ///
    /// Every write is evaluated against the state left by the writes before
    /// it; if any fails, nothing is applied. Returns the written documents.
    pub(crate) fn apply(&mut self, ops: Vec<WriteOp>) -> StoreResult<Vec<DocumentRef>> {
        let mut staged: BTreeMap<String, Option<FieldMap>> = BTreeMap::new();
        let mut touched = Vec::with_capacity(ops.len());

        for op in ops {
            let path = op.target().path().to_string();
            let current = match staged.get(&path) {
                Some(pending) => pending.clone(),
                None => self.docs.get(&path).map(|doc| doc.data.clone()),
            };
            let (doc, next) = match op {
                WriteOp::Set { doc, data, options } => {
                    let next = apply_set(current, data, &options)?;
                    (doc, Some(next))
                }
                WriteOp::Update { doc, fields } => {
                    let Some(mut existing) = current else {
                        return Err(StoreError::not_found(format!(
                            "no document to update: {doc}"
                        )));
                    };
                    for (field, value) in fields {
                        set_path(&mut existing, &field, value);
                    }
                    (doc, Some(existing))
                }
                WriteOp::Delete { doc } => (doc, None),
            };
            staged.insert(path, next);
            touched.push(doc);
        }

        self.version += 1;
        for (path, next) in staged {
            match next {
                Some(data) => {
                    self.docs.insert(
                        path,
                        StoredDocument {
                            data,
                            version: self.version,
                        },
                    );
                }
                None => {
                    self.docs.remove(&path);
                }
            }
        }
        Ok(touched)
    }
}

fn apply_set(
    current: Option<FieldMap>,
    data: FieldMap,
    options: &SetOptions,
) -> StoreResult<FieldMap> {
    match options {
        SetOptions::Overwrite => Ok(data),
        SetOptions::Merge => {
            let mut merged = current.unwrap_or_default();
            deep_merge(&mut merged, data);
            Ok(merged)
        }
        SetOptions::MergeFields(fields) => {
            let mut merged = current.unwrap_or_default();
            for field in fields {
                let value = get_path(&data, field).ok_or_else(|| {
                    StoreError::invalid_argument(format!(
                        "merge field {field} is not present in the data"
                    ))
                })?;
                set_path(&mut merged, field, value.clone());
            }
            Ok(merged)
        }
    }
}
