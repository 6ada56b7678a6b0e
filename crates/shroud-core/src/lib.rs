//! Shroud relay core logic
//!
//! Threshold batching and shuffling for the anonymizing relay that sits
//! between telemetry clients and the analyzer. Ciphertexts are opaque here:
//! the relay only decides *when* and *in what order* they are forwarded.
//!
//! # Anonymity Guarantee
//!
//! Ciphertexts are grouped by [`RoutingPolicy`]. A policy's buffer is flushed
//! exactly when it holds `threshold` ciphertexts, and the flushed batch is a
//! uniformly random permutation of its contents. The analyzer therefore sees
//! anonymity sets of exactly `threshold` items and learns nothing from the
//! order in which they arrived. Batches never mix policies.
//!
//! Buffers below threshold are never flushed, however long they wait. This
//! favours privacy over latency.
//!
//! # Components
//!
//! - [`buffer`]: Per-policy accumulation and shuffling
//! - [`dispatcher`]: Concurrent routing of submissions to buffers
//! - [`analyzer`]: Downstream sink abstraction
//! - [`config`]: Thresholds and size limits
//! - [`ciphertext`], [`policy`]: Data types
//! - [`error`]: Dispatch error types

pub mod analyzer;
pub mod buffer;
pub mod ciphertext;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod policy;

pub use analyzer::{Analyzer, ShuffledBatch};
pub use buffer::{BatchBuffer, BufferState};
pub use ciphertext::Ciphertext;
pub use config::DispatcherConfig;
pub use dispatcher::{ShuffleDispatcher, SubmitOutcome};
pub use error::DispatchError;
pub use policy::RoutingPolicy;
