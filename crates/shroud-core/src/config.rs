//! Dispatcher configuration.

use std::collections::HashMap;

use crate::{DispatchError, RoutingPolicy};

/// Thresholds and limits for a [`crate::ShuffleDispatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Batch size for policies without an override
    pub default_threshold: usize,
    /// Per-policy batch size overrides
    pub thresholds: HashMap<RoutingPolicy, usize>,
    /// Largest ciphertext accepted, in bytes
    pub max_ciphertext_len: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            default_threshold: 100,
            thresholds: HashMap::new(),
            max_ciphertext_len: 64 * 1024,
        }
    }
}

impl DispatcherConfig {
    /// Configuration with a single threshold for every policy.
    pub fn with_threshold(threshold: usize) -> Self {
        Self { default_threshold: threshold, ..Self::default() }
    }

    /// Batch size used for `policy`.
    pub fn threshold_for(&self, policy: &RoutingPolicy) -> usize {
        self.thresholds.get(policy).copied().unwrap_or(self.default_threshold)
    }

    /// Check all thresholds and limits.
    ///
    /// # Errors
    ///
    /// Returns `ZeroThreshold` for any zero threshold and `ZeroLengthLimit`
    /// if no ciphertext could ever be accepted.
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.default_threshold == 0 {
            return Err(DispatchError::ZeroThreshold { policy: None });
        }
        if let Some((policy, _)) = self.thresholds.iter().find(|(_, threshold)| **threshold == 0) {
            return Err(DispatchError::ZeroThreshold { policy: Some(*policy) });
        }
        if self.max_ciphertext_len == 0 {
            return Err(DispatchError::ZeroLengthLimit);
        }
        Ok(())
    }
}
