//! # docflow memory store
//!
//! An in-memory [`DocumentStore`](docflow_core::DocumentStore) with the
//! semantics of a managed document database, for tests and demos.
//!
//! ## Semantics
//!
//! - Set overwrites by default; merge sets deep-merge nested maps
//! - Updates take dotted field paths and fail with `not-found` when the
//!   document does not exist; deletes of missing documents succeed
//! - Every commit is atomic: one failing write leaves the store untouched
//! - Transactions are optimistic and abort if a document they read changed
//! - Queries support equality, range, membership and array filters,
//!   type-ordered sorting and limits
//! - Listeners get the current snapshot, then one per commit touching them;
//!   snapshot metadata never changes alone, so `MetadataChanges::Include`
//!   delivers the same snapshots as `Exclude`
//!
//! ## Failure injection
//!
//! [`MemoryStore::fail_next_commits`], [`MemoryStore::fail_next_transactions`]
//! and [`MemoryStore::fail_listeners`] make the store report client faults
//! on demand.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod listeners;
mod query;
mod state;
mod store;
mod transaction;
mod value;

pub use config::MemoryStoreConfig;
pub use store::MemoryStore;
