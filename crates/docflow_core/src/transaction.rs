//! Retrying transactions and typed helpers for transaction handles.
//!
//! ## Retry contract
//!
//! The driver runs the unit of work inside one atomic transaction per
//! attempt. The first successful attempt ends the loop. After the `n`-th
//! failure it waits `n × backoff_step` (500ms by default) and tries again,
//! until `max_attempts` attempts have failed; the last failure is then
//! reported.
//!
//! Each attempt is atomic, but the driver does not make the unit of work
//! idempotent: it may run several times and must be safe to re-execute.

use crate::config::RetryConfig;
use crate::error::{StoreError, StoreResult};
use crate::mapping::{from_snapshot, to_field_map};
use crate::outcome::Outcome;
use crate::store::{DocumentStore, Transaction};
use crate::types::{DocumentRef, SetOptions};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use tracing::{debug, warn};

/// Retrying transactions over any [`DocumentStore`].
pub trait TransactionRetryExt: DocumentStore {
    /// Runs `work` in a transaction, making up to `max_attempts` attempts
    /// with the default 500ms linear backoff.
    fn run_transaction_with_retry<T, F>(
        &self,
        max_attempts: u32,
        work: F,
    ) -> impl Future<Output = Outcome<T>> + Send
    where
        T: Send,
        F: FnMut(&mut dyn Transaction) -> StoreResult<T> + Send,
    {
        self.run_transaction_with_config(RetryConfig::new(max_attempts), work)
    }

    /// Runs `work` in a transaction using an explicit retry configuration.
    fn run_transaction_with_config<T, F>(
        &self,
        config: RetryConfig,
        mut work: F,
    ) -> impl Future<Output = Outcome<T>> + Send
    where
        T: Send,
        F: FnMut(&mut dyn Transaction) -> StoreResult<T> + Send,
    {
        async move {
            let mut attempts = 0u32;
            let mut last_error: Option<StoreError> = None;

            while attempts < config.max_attempts {
                match self.run_transaction(&mut work).await {
                    Ok(value) => {
                        if attempts > 0 {
                            debug!(attempt = attempts + 1, "transaction committed after retry");
                        }
                        return Outcome::Success(value);
                    }
                    Err(err) => {
                        attempts += 1;
                        if attempts >= config.max_attempts {
                            last_error = Some(err);
                            break;
                        }
                        let delay = config.sleep_for_attempt(attempts);
                        debug!(
                            attempt = attempts,
                            max_attempts = config.max_attempts,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "transaction attempt failed, backing off"
                        );
                        last_error = Some(err);
                        tokio::time::sleep(delay).await;
                    }
                }
            }

            let err = last_error.unwrap_or(StoreError::TransactionExhausted {
                attempts: config.max_attempts,
            });
            warn!(attempts, error = %err, "transaction attempts exhausted");
            Outcome::Error(err)
        }
    }
}

impl<S: DocumentStore + ?Sized> TransactionRetryExt for S {}

/// Typed reads and writes on a transaction handle.
///
/// Each helper reports through [`Outcome`] instead of returning a fault.
pub trait TransactionDataExt: Transaction {
    /// Reads and decodes a document.
    ///
    /// A missing document yields `Error(DocumentNotFound)`.
    fn get_data<T: DeserializeOwned>(&mut self, doc: &DocumentRef) -> Outcome<T> {
        let decoded = self
            .get(doc)
            .and_then(|snapshot| from_snapshot::<T>(&snapshot));
        match decoded {
            Ok(Some(value)) => Outcome::Success(value),
            Ok(None) => Outcome::Error(StoreError::DocumentNotFound {
                path: doc.path().to_string(),
            }),
            Err(err) => Outcome::Error(err),
        }
    }

    /// Encodes and stages a set of `data`, merging into the existing
    /// document when `merge` is true.
    fn set_data<T: Serialize + ?Sized>(
        &mut self,
        doc: &DocumentRef,
        data: &T,
        merge: bool,
    ) -> Outcome<()> {
        to_field_map(data)
            .and_then(|fields| self.set(doc, fields, SetOptions::merge_if(merge)))
            .into()
    }

    /// Stages a delete.
    fn delete_document(&mut self, doc: &DocumentRef) -> Outcome<()> {
        self.delete(doc).into()
    }
}

impl<X: Transaction + ?Sized> TransactionDataExt for X {}
