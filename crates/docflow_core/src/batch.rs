//! Atomic multi-document writes.

use crate::error::StoreResult;
use crate::mapping::{to_document_fields, to_field_map, Document};
use crate::outcome::Outcome;
use crate::store::{DocumentStore, WriteBatch};
use crate::types::{CollectionRef, DocumentRef, FieldMap, SetOptions};
use serde::Serialize;
use std::future::Future;
use tracing::trace;

/// Batched writes over any [`DocumentStore`].
///
/// Every helper stages its writes on one [`WriteBatch`] and commits it as a
/// single atomic unit: on `Error` none of the staged writes took effect.
pub trait BatchExt: DocumentStore {
    /// Stages writes with `stage` and commits them atomically.
    ///
    /// ```rust,ignore
    /// store.batch(|b| {
    ///     b.set(users.doc("ana"), fields);
    ///     b.delete(users.doc("old"));
    /// }).await;
    /// ```
    fn batch<F>(&self, stage: F) -> impl Future<Output = Outcome<()>> + Send
    where
        F: FnOnce(&mut WriteBatch),
    {
        let mut batch = WriteBatch::new();
        stage(&mut batch);
        self.commit_staged(Ok(batch))
    }

    /// Sets every `(target, value)` pair in one batch.
    ///
    /// `merge` applies to the whole batch: either every document is
    /// replaced, or every value is merged into its existing document.
    fn batch_set<T, I>(&self, documents: I, merge: bool) -> impl Future<Output = Outcome<()>> + Send
    where
        T: Serialize,
        I: IntoIterator<Item = (DocumentRef, T)>,
    {
        let options = SetOptions::merge_if(merge);
        let staged = documents
            .into_iter()
            .try_fold(
                WriteBatch::new(),
                |mut batch, (doc, value)| -> StoreResult<WriteBatch> {
                    batch.set_with_options(doc, to_field_map(&value)?, options.clone());
                    Ok(batch)
                },
            );
        self.commit_staged(staged)
    }

    /// Sets typed documents into `collection`, each under its own ID.
    ///
    /// The ID is taken from the reference, so it is not stored as a field.
    fn batch_set_documents<'a, T, I>(
        &self,
        collection: &CollectionRef,
        documents: I,
        merge: bool,
    ) -> impl Future<Output = Outcome<()>> + Send
    where
        T: Document + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let options = SetOptions::merge_if(merge);
        let staged = documents.into_iter().try_fold(
            WriteBatch::new(),
            |mut batch, document| -> StoreResult<WriteBatch> {
                batch.set_with_options(
                    collection.doc(document.id()),
                    to_document_fields(document)?,
                    options.clone(),
                );
                Ok(batch)
            },
        );
        self.commit_staged(staged)
    }

    /// Deletes every target in one batch.
    fn batch_delete<I>(&self, documents: I) -> impl Future<Output = Outcome<()>> + Send
    where
        I: IntoIterator<Item = DocumentRef>,
    {
        self.batch(|batch| {
            for doc in documents {
                batch.delete(doc);
            }
        })
    }

    /// Applies one partial update per `(target, fields)` pair in one batch.
    ///
    /// If any target does not exist the whole batch fails.
    fn batch_update<I>(&self, updates: I) -> impl Future<Output = Outcome<()>> + Send
    where
        I: IntoIterator<Item = (DocumentRef, FieldMap)>,
    {
        self.batch(|batch| {
            for (doc, fields) in updates {
                batch.update(doc, fields);
            }
        })
    }

    /// Commits an already staged batch, or reports the staging failure.
    fn commit_staged(
        &self,
        staged: StoreResult<WriteBatch>,
    ) -> impl Future<Output = Outcome<()>> + Send {
        async move {
            let batch = match staged {
                Ok(batch) => batch,
                Err(err) => return Outcome::Error(err),
            };
            trace!(writes = batch.len(), "committing batch");
            self.commit(batch).await.into()
        }
    }
}

impl<S: DocumentStore + ?Sized> BatchExt for S {}
