//! # docflow testkit
//!
//! Test utilities for docflow.
//!
//! This crate provides:
//! - The sample [`Task`] document type and seeded in-memory stores
//! - Property-based test generators using proptest
//! - [`RecordingStore`], a wrapper timing transaction attempts
//!
//! ## Usage
//!
//! ```rust,ignore
//! use docflow_testkit::prelude::*;
//!
//! #[tokio::test(start_paused = true)]
//! async fn retries_are_spaced() {
//!     let store = RecordingStore::new(seeded_store());
//!     store.inner().fail_next_transactions(2, ErrorCode::Aborted);
//!     store.run_transaction_with_retry(5, |_| Ok(())).await;
//!     assert_eq!(store.attempt_gaps().len(), 2);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod recording;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::recording::*;
    pub use docflow_core::prelude::*;
    pub use docflow_core::ErrorCode;
    pub use docflow_memory::{MemoryStore, MemoryStoreConfig};
}

pub use fixtures::*;
pub use generators::*;
pub use recording::*;
