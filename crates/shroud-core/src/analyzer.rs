//! Downstream analyzer sink.

use std::sync::Arc;

use crate::{Ciphertext, RoutingPolicy};

/// A flushed, shuffled batch for one routing policy.
///
/// Always holds exactly the policy's threshold worth of ciphertexts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuffledBatch {
    policy: RoutingPolicy,
    ciphertexts: Vec<Ciphertext>,
}

impl ShuffledBatch {
    /// Wrap an already shuffled set of ciphertexts.
    pub fn new(policy: RoutingPolicy, ciphertexts: Vec<Ciphertext>) -> Self {
        Self { policy, ciphertexts }
    }

    /// Policy every ciphertext in the batch was submitted under.
    pub fn policy(&self) -> RoutingPolicy {
        self.policy
    }

    /// Ciphertexts in shuffled order.
    pub fn ciphertexts(&self) -> &[Ciphertext] {
        &self.ciphertexts
    }

    /// Number of ciphertexts.
    pub fn len(&self) -> usize {
        self.ciphertexts.len()
    }

    /// True for an empty batch. Never the case for dispatcher output.
    pub fn is_empty(&self) -> bool {
        self.ciphertexts.is_empty()
    }

    /// Split into policy and ciphertexts.
    pub fn into_parts(self) -> (RoutingPolicy, Vec<Ciphertext>) {
        (self.policy, self.ciphertexts)
    }
}

/// Receiver of shuffled batches.
///
/// Delivery is fire-and-forget: `send` has no return value and the
/// dispatcher neither retries nor reports failures. Implementations are
/// called while the policy's buffer is locked, so they should hand the batch
/// off (e.g. to a channel) rather than block on I/O.
pub trait Analyzer: Send + Sync {
    /// Accept one batch.
    fn send(&self, batch: ShuffledBatch);
}

impl<A: Analyzer + ?Sized> Analyzer for Arc<A> {
    fn send(&self, batch: ShuffledBatch) {
        (**self).send(batch);
    }
}
