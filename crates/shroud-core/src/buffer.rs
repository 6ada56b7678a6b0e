//! Per-policy batch buffer.
//!
//! A buffer accumulates ciphertexts until it holds exactly `threshold` of
//! them, then releases the whole set in a uniformly random order and starts
//! over empty.
//!
//! # State Machine
//!
//! ```text
//!           append (len + 1 < threshold)
//!              ┌──────────────┐
//!              ▼              │
//!        Accumulating ────────┘
//!              │
//!              │ append (len + 1 == threshold)
//!              ▼
//!        FlushPending ── shuffle + drain ──► Accumulating (empty)
//! ```
//!
//! `FlushPending` is transient: [`BatchBuffer::append`] drains in the same
//! call, so callers only ever observe `Accumulating`.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;

use crate::{Ciphertext, DispatchError};

/// Observable state of a [`BatchBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// Holding fewer than `threshold` ciphertexts
    Accumulating,
    /// Threshold reached, batch not yet drained
    FlushPending,
}

/// Ciphertexts waiting for one routing policy's threshold.
#[derive(Debug)]
pub struct BatchBuffer {
    threshold: usize,
    pending: Vec<Ciphertext>,
    rng: ChaCha20Rng,
}

impl BatchBuffer {
    /// Create an empty buffer.
    ///
    /// # Errors
    ///
    /// Returns `ZeroThreshold` if `threshold` is zero.
    pub fn new(threshold: usize, rng: ChaCha20Rng) -> Result<Self, DispatchError> {
        if threshold == 0 {
            return Err(DispatchError::ZeroThreshold { policy: None });
        }
        Ok(Self { threshold, pending: Vec::with_capacity(threshold), rng })
    }

    /// Append one ciphertext.
    ///
    /// Returns the shuffled batch when this append reaches the threshold,
    /// leaving the buffer empty. Otherwise returns `None`.
    pub fn append(&mut self, ciphertext: Ciphertext) -> Option<Vec<Ciphertext>> {
        self.pending.push(ciphertext);
        match self.state() {
            BufferState::Accumulating => None,
            BufferState::FlushPending => Some(self.drain_shuffled()),
        }
    }

    /// Current state.
    pub fn state(&self) -> BufferState {
        if self.pending.len() >= self.threshold {
            BufferState::FlushPending
        } else {
            BufferState::Accumulating
        }
    }

    /// Ciphertexts currently held.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Batch size that triggers a flush.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    fn drain_shuffled(&mut self) -> Vec<Ciphertext> {
        let mut batch = std::mem::replace(&mut self.pending, Vec::with_capacity(self.threshold));
        batch.shuffle(&mut self.rng);
        batch
    }
}
