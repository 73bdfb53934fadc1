//! # docflow
//!
//! Convenience layer over a document-database client.
//!
//! This crate provides:
//! - A three-state [`Outcome`] (loading / success / error) that every
//!   operation reports through instead of propagating faults
//! - Transactions retried with linear backoff
//! - Atomic batch set / update / delete helpers
//! - Live snapshot subscriptions as streams of outcomes
//! - Query builders keyed by typed field tokens
//! - serde-based mapping between typed documents and stored fields
//!
//! ## Architecture
//!
//! The client itself is abstracted by the [`DocumentStore`] and
//! [`Transaction`] traits. It owns networking, consistency, storage and
//! query execution. The extension traits ([`BatchExt`], [`DocumentExt`],
//! [`SnapshotExt`], [`TransactionRetryExt`], [`TransactionDataExt`]) are
//! implemented for every store and forward one call each, converting the
//! result into an [`Outcome`].
//!
//! ## Key Invariants
//!
//! - No wrapped operation returns a raw fault; failures become `Outcome::Error`
//! - Batches commit atomically: on error no staged write took effect
//! - A transaction attempt is atomic, but the unit of work may run more
//!   than once and must be safe to re-execute
//! - A snapshot stream ends after its first `Error`

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod batch;
mod config;
mod document;
mod error;
mod field;
mod mapping;
mod outcome;
mod query;
mod snapshot;
mod store;
mod transaction;
mod types;

pub use batch::BatchExt;
pub use config::{MetadataChanges, RetryConfig, DEFAULT_BACKOFF_STEP, DEFAULT_MAX_ATTEMPTS};
pub use document::DocumentExt;
pub use error::{ErrorCode, StoreError, StoreResult};
pub use field::Field;
pub use mapping::{
    from_query_snapshot, from_snapshot, to_document_fields, to_field_map, Document,
    DOCUMENT_ID_FIELD,
};
pub use outcome::Outcome;
pub use query::{Direction, Filter, FilterOp, OrderBy, Query};
pub use snapshot::{with_state, OutcomeStream, SnapshotExt};
pub use store::{DocumentStore, SnapshotStream, Transaction, WriteBatch, WriteOp};
pub use transaction::{TransactionDataExt, TransactionRetryExt};
pub use types::{
    CollectionRef, DocumentRef, DocumentSnapshot, FieldMap, QuerySnapshot, SetOptions,
    SnapshotMetadata,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        BatchExt, CollectionRef, DocumentExt, DocumentRef, DocumentStore, Field, FieldMap,
        MetadataChanges, Outcome, Query, RetryConfig, SnapshotExt, StoreError, Transaction,
        TransactionDataExt, TransactionRetryExt,
    };
}
