//! Configuration for the in-memory store.

use std::time::Duration;

/// Configuration for a [`MemoryStore`](crate::MemoryStore).
///
/// # Example
///
/// ```rust
/// use docflow_memory::MemoryStoreConfig;
/// use std::time::Duration;
///
/// let config = MemoryStoreConfig::new()
///     .with_latency(Duration::from_millis(20))
///     .with_read_validation(false);
/// assert!(!config.validate_transaction_reads);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStoreConfig {
    /// Abort a transaction at commit if a document it read was written in
    /// the meantime.
    pub validate_transaction_reads: bool,
    /// Delay applied before every asynchronous operation, to mimic a
    /// round trip.
    pub latency: Duration,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            validate_transaction_reads: true,
            latency: Duration::ZERO,
        }
    }
}

impl MemoryStoreConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the simulated round-trip latency.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Enables or disables read validation at transaction commit.
    #[must_use]
    pub fn with_read_validation(mut self, validate: bool) -> Self {
        self.validate_transaction_reads = validate;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = MemoryStoreConfig::default();
        assert!(config.validate_transaction_reads);
        assert_eq!(config.latency, Duration::ZERO);
    }
}
