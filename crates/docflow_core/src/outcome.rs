//! Three-state outcome of an operation against the document store.

use crate::error::{StoreError, StoreResult};

/// The outcome of an asynchronous store operation.
///
/// Every operation in this crate reports through `Outcome` instead of
/// returning a bare value or propagating a fault. Exactly one state is
/// active, and an outcome is never modified after construction.
///
/// Streams of outcomes emit `Loading` once when a subscription starts,
/// followed by one terminal state per underlying event.
///
/// # Example
///
/// ```rust
/// use docflow_core::Outcome;
///
/// let outcome: Outcome<u32> = Outcome::Success(7);
/// let mut seen = None;
/// outcome
///     .on_success(|v| seen = Some(*v))
///     .on_error(|e| panic!("unexpected: {e}"));
/// assert_eq!(seen, Some(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "an outcome may carry an error that should be inspected"]
pub enum Outcome<T> {
    /// The operation is in flight.
    Loading,
    /// The operation completed with a value.
    Success(T),
    /// The operation failed.
    Error(StoreError),
}

impl<T> Outcome<T> {
    /// Runs `action` with the value if this outcome succeeded.
    ///
    /// Returns `self` unchanged so reactions can be chained.
    pub fn on_success<F>(&self, action: F) -> &Self
    where
        F: FnOnce(&T),
    {
        if let Outcome::Success(value) = self {
            action(value);
        }
        self
    }

    /// Runs `action` with the cause if this outcome failed.
    pub fn on_error<F>(&self, action: F) -> &Self
    where
        F: FnOnce(&StoreError),
    {
        if let Outcome::Error(err) = self {
            action(err);
        }
        self
    }

    /// Runs `action` if this outcome is still loading.
    pub fn on_loading<F>(&self, action: F) -> &Self
    where
        F: FnOnce(),
    {
        if let Outcome::Loading = self {
            action();
        }
        self
    }

    /// Returns true if the operation is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, Outcome::Loading)
    }

    /// Returns true if the operation succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Returns true if the operation failed.
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    /// Returns the value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the failure cause, if any.
    pub fn error(&self) -> Option<&StoreError> {
        match self {
            Outcome::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Consumes the outcome and returns the value, if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Maps the success value, leaving the other states untouched.
    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Outcome::Loading => Outcome::Loading,
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Error(err) => Outcome::Error(err),
        }
    }

    /// Converts a settled outcome into a `Result`.
    ///
    /// Returns `None` while the operation is loading.
    pub fn into_result(self) -> Option<StoreResult<T>> {
        match self {
            Outcome::Loading => None,
            Outcome::Success(value) => Some(Ok(value)),
            Outcome::Error(err) => Some(Err(err)),
        }
    }
}

impl<T> From<StoreResult<T>> for Outcome<T> {
    fn from(result: StoreResult<T>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(err) => Outcome::Error(err),
        }
    }
}
