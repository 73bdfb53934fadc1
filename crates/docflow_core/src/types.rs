//! References, snapshots and write options.

use crate::query::Query;
use serde_json::{Map, Value};
use std::fmt;

/// Field values keyed by field name.
pub type FieldMap = Map<String, Value>;

/// A reference to a single document, addressed by its slash-separated path.
///
/// Paths alternate collection and document segments (`users/alice`,
/// `users/alice/posts/p1`). The path is not validated; a single-segment
/// path has an empty parent collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentRef {
    path: String,
}

impl DocumentRef {
    /// Creates a document reference from a full path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: trim_path(path.into()),
        }
    }

    /// Returns the full document path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the document ID (the last path segment).
    pub fn id(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Returns the collection containing this document.
    pub fn parent(&self) -> CollectionRef {
        match self.path.rsplit_once('/') {
            Some((parent, _)) => CollectionRef::new(parent),
            None => CollectionRef::new(""),
        }
    }

    /// Returns a reference to a subcollection of this document.
    pub fn collection(&self, name: &str) -> CollectionRef {
        CollectionRef::new(format!("{}/{}", self.path, name))
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// A reference to a collection of documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionRef {
    path: String,
}

impl CollectionRef {
    /// Creates a collection reference from a full path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: trim_path(path.into()),
        }
    }

    /// Returns the full collection path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the collection ID (the last path segment).
    pub fn id(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Returns a reference to the document with the given ID.
    pub fn doc(&self, id: &str) -> DocumentRef {
        DocumentRef::new(format!("{}/{}", self.path, id))
    }

    /// Returns a reference to a new document with a random ID.
    pub fn new_doc(&self) -> DocumentRef {
        self.doc(&uuid::Uuid::new_v4().simple().to_string())
    }

    /// Returns a query over every document in this collection.
    pub fn query(&self) -> Query {
        Query::new(self.clone())
    }

    /// Returns true if `doc` is a direct child of this collection.
    pub fn contains(&self, doc: &DocumentRef) -> bool {
        doc.parent() == *self
    }
}

impl fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

fn trim_path(path: String) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.len() == path.len() {
        path
    } else {
        trimmed.to_string()
    }
}

/// How a set operation treats fields already present in the document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SetOptions {
    /// Replace the whole document.
    #[default]
    Overwrite,
    /// Merge the given fields into the existing document.
    Merge,
    /// Merge only the listed field paths.
    MergeFields(Vec<String>),
}

impl SetOptions {
    /// Returns `Merge` when `merge` is true, `Overwrite` otherwise.
    pub fn merge_if(merge: bool) -> Self {
        if merge {
            SetOptions::Merge
        } else {
            SetOptions::Overwrite
        }
    }
}

/// Metadata describing the origin of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SnapshotMetadata {
    /// The snapshot was served from a local cache.
    pub from_cache: bool,
    /// The snapshot contains local writes not yet committed by the backend.
    pub has_pending_writes: bool,
}

/// A point-in-time view of a single document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    /// The document this snapshot was taken from.
    pub reference: DocumentRef,
    /// The document fields, or `None` if the document does not exist.
    pub data: Option<FieldMap>,
    /// Snapshot metadata.
    pub metadata: SnapshotMetadata,
}

impl DocumentSnapshot {
    /// Creates a snapshot of an existing document.
    pub fn existing(reference: DocumentRef, data: FieldMap) -> Self {
        Self {
            reference,
            data: Some(data),
            metadata: SnapshotMetadata::default(),
        }
    }

    /// Creates a snapshot of a missing document.
    pub fn missing(reference: DocumentRef) -> Self {
        Self {
            reference,
            data: None,
            metadata: SnapshotMetadata::default(),
        }
    }

    /// Returns the document ID.
    pub fn id(&self) -> &str {
        self.reference.id()
    }

    /// Returns true if the document exists.
    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    /// Returns a single field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|data| data.get(field))
    }
}

/// A point-in-time view of the documents matching a query.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySnapshot {
    /// Matching documents, in query order. All of them exist.
    pub documents: Vec<DocumentSnapshot>,
    /// Snapshot metadata.
    pub metadata: SnapshotMetadata,
}

impl QuerySnapshot {
    /// Creates a snapshot from matching documents.
    pub fn new(documents: Vec<DocumentSnapshot>) -> Self {
        Self {
            documents,
            metadata: SnapshotMetadata::default(),
        }
    }

    /// Returns the number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if no documents matched.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_paths() {
        let doc = DocumentRef::new("/users/alice/");
        assert_eq!(doc.path(), "users/alice");
        assert_eq!(doc.id(), "alice");
        assert_eq!(doc.parent(), CollectionRef::new("users"));

        let posts = doc.collection("posts");
        assert_eq!(posts.path(), "users/alice/posts");
        assert_eq!(posts.doc("p1").path(), "users/alice/posts/p1");
        assert_eq!(posts.doc("p1").parent().id(), "posts");
    }

    #[test]
    fn single_segment_document_has_empty_parent() {
        let doc = DocumentRef::new("users");
        assert_eq!(doc.id(), "users");
        assert_eq!(doc.parent().path(), "");
    }

    #[test]
    fn new_doc_ids_are_unique() {
        let users = CollectionRef::new("users");
        let a = users.new_doc();
        let b = users.new_doc();
        assert_ne!(a, b);
        assert!(users.contains(&a));
        assert_eq!(a.id().len(), 32);
    }

    #[test]
    fn snapshot_accessors() {
        let mut data = FieldMap::new();
        data.insert("title".into(), Value::from("write docs"));
        let snap = DocumentSnapshot::existing(DocumentRef::new("tasks/t1"), data);
        assert!(snap.exists());
        assert_eq!(snap.id(), "t1");
        assert_eq!(snap.get("title"), Some(&Value::from("write docs")));

        let missing = DocumentSnapshot::missing(DocumentRef::new("tasks/t2"));
        assert!(!missing.exists());
        assert!(missing.get("title").is_none());
    }

    #[test]
    fn set_options_from_flag() {
        assert_eq!(SetOptions::merge_if(true), SetOptions::Merge);
        assert_eq!(SetOptions::merge_if(false), SetOptions::Overwrite);
    }
}
