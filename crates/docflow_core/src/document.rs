//! One-shot document reads and field updates.

use crate::error::StoreError;
use crate::mapping::{from_query_snapshot, from_snapshot};
use crate::outcome::Outcome;
use crate::query::Query;
use crate::store::DocumentStore;
use crate::types::{DocumentRef, DocumentSnapshot, FieldMap, QuerySnapshot};
use serde::de::DeserializeOwned;
use std::future::Future;

/// Single-call document operations over any [`DocumentStore`].
pub trait DocumentExt: DocumentStore {
    /// Updates specific fields of an existing document.
    fn update_data(
        &self,
        doc: &DocumentRef,
        updates: FieldMap,
    ) -> impl Future<Output = Outcome<()>> + Send {
        async move { self.update(doc, updates).await.into() }
    }

    /// Reads a document snapshot.
    fn get_snapshot(
        &self,
        doc: &DocumentRef,
    ) -> impl Future<Output = Outcome<DocumentSnapshot>> + Send {
        async move { self.get_document(doc).await.into() }
    }

    /// Reads and decodes a document.
    ///
    /// A missing document yields `Error(DocumentNotFound)`.
    fn get_data<T>(&self, doc: &DocumentRef) -> impl Future<Output = Outcome<T>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move {
            let snapshot = match self.get_document(doc).await {
                Ok(snapshot) => snapshot,
                Err(err) => return Outcome::Error(err),
            };
            match from_snapshot(&snapshot) {
                Ok(Some(value)) => Outcome::Success(value),
                Ok(None) => Outcome::Error(StoreError::DocumentNotFound {
                    path: doc.path().to_string(),
                }),
                Err(err) => Outcome::Error(err),
            }
        }
    }

    /// Executes a query once.
    fn get_query_snapshot(
        &self,
        query: &Query,
    ) -> impl Future<Output = Outcome<QuerySnapshot>> + Send {
        async move { self.get_query(query).await.into() }
    }

    /// Executes a query once and decodes every matching document.
    fn get_query_data<T>(&self, query: &Query) -> impl Future<Output = Outcome<Vec<T>>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move {
            self.get_query(query)
                .await
                .and_then(|snapshot| from_query_snapshot(&snapshot))
                .into()
        }
    }
}

impl<S: DocumentStore + ?Sized> DocumentExt for S {}
