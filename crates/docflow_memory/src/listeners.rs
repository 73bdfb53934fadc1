//! Snapshot listeners fed after every commit.

use crate::state::StoreState;
use docflow_core::{
    DocumentRef, DocumentSnapshot, Query, QuerySnapshot, SnapshotStream, StoreError, StoreResult,
};
use futures_util::stream;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;

struct DocumentListener {
    target: DocumentRef,
    sender: UnboundedSender<StoreResult<DocumentSnapshot>>,
}

struct QueryListener {
    query: Query,
    sender: UnboundedSender<StoreResult<QuerySnapshot>>,
}

/// Registered listeners.
///
/// A listener is dropped after it is sent an error, which closes its
/// channel and ends the subscriber's stream right after the error.
#[derive(Default)]
pub(crate) struct Listeners {
    documents: Vec<DocumentListener>,
    queries: Vec<QueryListener>,
}

impl Listeners {
    /// Registers a document listener and sends it the current snapshot.
    pub(crate) fn add_document(
        &mut self,
        target: DocumentRef,
        state: &StoreState,
    ) -> SnapshotStream<DocumentSnapshot> {
        let (sender, receiver) = unbounded_channel();
        if sender.send(Ok(state.snapshot(&target))).is_ok() {
            self.documents.push(DocumentListener { target, sender });
        }
        receiver_stream(receiver)
    }

    /// Registers a query listener and sends it the current results.
    ///
    /// A query that fails to evaluate yields its error and is not kept.
    pub(crate) fn add_query(
        &mut self,
        query: Query,
        state: &StoreState,
    ) -> SnapshotStream<QuerySnapshot> {
        let (sender, receiver) = unbounded_channel();
        match state.query(&query) {
            Ok(snapshot) => {
                if sender.send(Ok(snapshot)).is_ok() {
                    self.queries.push(QueryListener { query, sender });
                }
            }
            Err(err) => {
                debug!(collection = %query.collection(), error = %err, "query listener rejected");
                let _ = sender.send(Err(err));
            }
        }
        receiver_stream(receiver)
    }

    /// Sends fresh snapshots to every listener observing a document in
    /// `touched`.
    pub(crate) fn notify(&mut self, touched: &[DocumentRef], state: &StoreState) {
        if touched.is_empty() {
            return;
        }

        self.documents.retain(|listener| {
            if !touched.contains(&listener.target) {
                return !listener.sender.is_closed();
            }
            listener
                .sender
                .send(Ok(state.snapshot(&listener.target)))
                .is_ok()
        });

        self.queries.retain(|listener| {
            let collection = listener.query.collection();
            if !touched.iter().any(|doc| collection.contains(doc)) {
                return !listener.sender.is_closed();
            }
            match state.query(&listener.query) {
                Ok(snapshot) => listener.sender.send(Ok(snapshot)).is_ok(),
                Err(err) => {
                    let _ = listener.sender.send(Err(err));
                    false
                }
            }
        });
    }

    /// Sends `error` to every listener and drops them all.
    pub(crate) fn fail_all(&mut self, error: &StoreError) {
        for listener in self.documents.drain(..) {
            let _ = listener.sender.send(Err(error.clone()));
        }
        for listener in self.queries.drain(..) {
            let _ = listener.sender.send(Err(error.clone()));
        }
    }

    /// Returns the number of listeners whose subscriber is still alive.
    pub(crate) fn active(&self) -> usize {
        let documents = self
            .documents
            .iter()
            .filter(|l| !l.sender.is_closed())
            .count();
        let queries = self
            .queries
            .iter()
            .filter(|l| !l.sender.is_closed())
            .count();
        documents + queries
    }
}

fn receiver_stream<T: Send + 'static>(receiver: UnboundedReceiver<StoreResult<T>>) -> SnapshotStream<T> {
    Box::pin(stream::unfold(receiver, |mut receiver| async move {
        let item = receiver.recv().await?;
        Some((item, receiver))
    }))
}
