//! Live snapshot subscriptions as streams of [`Outcome`]s.
//!
//! Every adapter yields `Loading` first, then `Success` for each snapshot
//! the subscription delivers. The first failure, either from the
//! subscription itself or from decoding a snapshot, is yielded as `Error`
//! and ends the stream. Nothing resubscribes automatically.
//!
//! Streams are lazy: the store is not subscribed to until the stream is
//! polled past `Loading`, so the first snapshot reflects the store at that
//! point.

use crate::config::MetadataChanges;
use crate::error::StoreResult;
use crate::mapping::{from_query_snapshot, from_snapshot};
use crate::outcome::Outcome;
use crate::query::Query;
use crate::store::{DocumentStore, SnapshotStream};
use crate::types::{CollectionRef, DocumentRef, DocumentSnapshot, QuerySnapshot};
use futures_util::stream::{self, Stream, StreamExt};
use serde::de::DeserializeOwned;
use std::future;
use std::pin::Pin;
use tracing::debug;

/// A stream of outcomes produced by a snapshot adapter.
pub type OutcomeStream<'a, T> = Pin<Box<dyn Stream<Item = Outcome<T>> + Send + 'a>>;

/// Wraps a snapshot subscription, mapping each snapshot with `map`.
///
/// `subscribe` runs on the first poll after `Loading` has been yielded.
pub fn with_state<'a, T, U, S, F>(subscribe: S, map: F) -> OutcomeStream<'a, U>
where
    T: Send + 'static,
    U: Send + 'a,
    S: FnOnce() -> SnapshotStream<T> + Send + 'a,
    F: FnMut(T) -> StoreResult<U> + Send + 'a,
{
    let loading = stream::once(future::ready(Outcome::Loading));
    let source = stream::once(async move { subscribe() }).flatten().boxed();
    let events = stream::unfold(Some((source, map)), |state| async move {
        let (mut source, mut map) = state?;
        let item = source.next().await?;
        match item.and_then(&mut map) {
            Ok(value) => Some((Outcome::Success(value), Some((source, map)))),
            Err(err) => {
                debug!(error = %err, "snapshot subscription terminated");
                Some((Outcome::Error(err), None))
            }
        }
    });
    Box::pin(loading.chain(events))
}

/// Snapshot subscriptions over any [`DocumentStore`].
pub trait SnapshotExt: DocumentStore {
    /// Observes a document's snapshots.
    fn document_snapshots_with_state(
        &self,
        doc: &DocumentRef,
        changes: MetadataChanges,
    ) -> OutcomeStream<'_, DocumentSnapshot> {
        let doc = doc.clone();
        with_state(move || self.listen_document(&doc, changes), Ok)
    }

    /// Observes a document decoded as `T`; `None` while it does not exist.
    fn document_objects_with_state<T>(
        &self,
        doc: &DocumentRef,
        changes: MetadataChanges,
    ) -> OutcomeStream<'_, Option<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let doc = doc.clone();
        with_state(move || self.listen_document(&doc, changes), |snapshot| {
            from_snapshot(&snapshot)
        })
    }

    /// Observes the snapshots of a query.
    fn query_snapshots_with_state(
        &self,
        query: &Query,
        changes: MetadataChanges,
    ) -> OutcomeStream<'_, QuerySnapshot> {
        let query = query.clone();
        with_state(move || self.listen_query(&query, changes), Ok)
    }

    /// Observes the documents of a query decoded as `T`.
    fn query_objects_with_state<T>(
        &self,
        query: &Query,
        changes: MetadataChanges,
    ) -> OutcomeStream<'_, Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let query = query.clone();
        with_state(move || self.listen_query(&query, changes), |snapshot| {
            from_query_snapshot(&snapshot)
        })
    }

    /// Observes every document of a collection.
    fn collection_snapshots_with_state(
        &self,
        collection: &CollectionRef,
        changes: MetadataChanges,
    ) -> OutcomeStream<'_, QuerySnapshot> {
        self.query_snapshots_with_state(&collection.query(), changes)
    }

    /// Observes every document of a collection decoded as `T`.
    fn collection_objects_with_state<T>(
        &self,
        collection: &CollectionRef,
        changes: MetadataChanges,
    ) -> OutcomeStream<'_, Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.query_objects_with_state(&collection.query(), changes)
    }
}

impl<S: DocumentStore + ?Sized> SnapshotExt for S {}
