//! Shuffle dispatcher.
//!
//! Routes each submission to its policy's [`BatchBuffer`] and forwards full
//! batches to the [`Analyzer`].
//!
//! # Concurrency
//!
//! Buffers live in a map behind an `RwLock`; each buffer has its own
//! `Mutex`. Submissions for different policies only contend on the map read
//! lock. For a single policy the append, the threshold check, the drain and
//! the `Analyzer::send` call all happen under that policy's mutex, so a batch
//! is never split between callers and batches for a policy reach the
//! analyzer in the order their thresholds were reached.
//!
//! # Randomness
//!
//! Every buffer owns a `ChaCha20Rng` seeded from a dispatcher-wide seeder.
//! The seeder draws from OS entropy, or from a fixed seed for reproducible
//! tests.

use std::{collections::HashMap, sync::Arc};

use parking_lot::{Mutex, RwLock};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::{
    Analyzer, BatchBuffer, Ciphertext, DispatchError, DispatcherConfig, RoutingPolicy,
    ShuffledBatch,
};

/// Result of a successful [`ShuffleDispatcher::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Ciphertext is waiting in its policy's buffer
    Buffered {
        /// Ciphertexts now pending for the policy
        pending: usize,
    },
    /// Ciphertext completed a batch that was sent to the analyzer
    Flushed {
        /// Size of the batch sent
        batch_size: usize,
    },
}

/// Threshold batching front end for an [`Analyzer`].
pub struct ShuffleDispatcher<A> {
    config: DispatcherConfig,
    analyzer: A,
    buffers: RwLock<HashMap<RoutingPolicy, Arc<Mutex<BatchBuffer>>>>,
    seeder: Mutex<ChaCha20Rng>,
}

impl<A: Analyzer> ShuffleDispatcher<A> {
    /// Create a dispatcher whose shuffles are seeded from OS entropy.
    ///
    /// # Errors
    ///
    /// Returns the error from [`DispatcherConfig::validate`].
    pub fn new(config: DispatcherConfig, analyzer: A) -> Result<Self, DispatchError> {
        Self::with_rng(config, analyzer, ChaCha20Rng::from_entropy())
    }

    /// Create a dispatcher with reproducible shuffles.
    ///
    /// Only for tests and simulations: a known seed makes the permutation
    /// predictable and voids the anonymity guarantee.
    ///
    /// # Errors
    ///
    /// Returns the error from [`DispatcherConfig::validate`].
    pub fn with_seed(
        config: DispatcherConfig,
        analyzer: A,
        seed: u64,
    ) -> Result<Self, DispatchError> {
        Self::with_rng(config, analyzer, ChaCha20Rng::seed_from_u64(seed))
    }

    fn with_rng(
        config: DispatcherConfig,
        analyzer: A,
        seeder: ChaCha20Rng,
    ) -> Result<Self, DispatchError> {
        config.validate()?;
        Ok(Self {
            config,
            analyzer,
            buffers: RwLock::new(HashMap::new()),
            seeder: Mutex::new(seeder),
        })
    }

    /// Submit one ciphertext under `policy`.
    ///
    /// If this submission brings the policy's buffer to its threshold, the
    /// shuffled batch is sent to the analyzer before returning.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCiphertext` or `CiphertextTooLarge` without touching
    /// any buffer.
    pub fn submit(
        &self,
        policy: RoutingPolicy,
        ciphertext: Ciphertext,
    ) -> Result<SubmitOutcome, DispatchError> {
        if ciphertext.is_empty() {
            return Err(DispatchError::EmptyCiphertext);
        }
        let max = self.config.max_ciphertext_len;
        if ciphertext.len() > max {
            return Err(DispatchError::CiphertextTooLarge { len: ciphertext.len(), max });
        }

        let buffer = self.buffer_for(policy)?;
        let mut buffer = buffer.lock();

        match buffer.append(ciphertext) {
            None => Ok(SubmitOutcome::Buffered { pending: buffer.len() }),
            Some(batch) => {
                let batch_size = batch.len();
                tracing::debug!(%policy, batch_size, "flushing shuffled batch");
                self.analyzer.send(ShuffledBatch::new(policy, batch));
                Ok(SubmitOutcome::Flushed { batch_size })
            },
        }
    }

    /// Ciphertexts waiting for `policy`'s threshold.
    pub fn pending(&self, policy: &RoutingPolicy) -> usize {
        let buffer = self.buffers.read().get(policy).cloned();
        buffer.map_or(0, |buffer| buffer.lock().len())
    }

    /// Pending counts for every policy seen so far.
    pub fn pending_by_policy(&self) -> Vec<(RoutingPolicy, usize)> {
        let buffers: Vec<_> = self
            .buffers
            .read()
            .iter()
            .map(|(policy, buffer)| (*policy, Arc::clone(buffer)))
            .collect();

        let mut counts: Vec<_> =
            buffers.into_iter().map(|(policy, buffer)| (policy, buffer.lock().len())).collect();
        counts.sort_unstable();
        counts
    }

    /// Downstream analyzer.
    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// Active configuration.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    fn buffer_for(&self, policy: RoutingPolicy) -> Result<Arc<Mutex<BatchBuffer>>, DispatchError> {
        if let Some(buffer) = self.buffers.read().get(&policy) {
            return Ok(Arc::clone(buffer));
        }

        let mut buffers = self.buffers.write();
        // Another submitter may have created it between the two locks
        if let Some(buffer) = buffers.get(&policy) {
            return Ok(Arc::clone(buffer));
        }

        let threshold = self.config.threshold_for(&policy);
        let buffer = Arc::new(Mutex::new(BatchBuffer::new(threshold, self.buffer_rng())?));
        buffers.insert(policy, Arc::clone(&buffer));
        tracing::debug!(%policy, threshold, "created batch buffer");
        Ok(buffer)
    }

    fn buffer_rng(&self) -> ChaCha20Rng {
        let mut seed = <ChaCha20Rng as SeedableRng>::Seed::default();
        self.seeder.lock().fill_bytes(&mut seed);
        ChaCha20Rng::from_seed(seed)
    }
}
