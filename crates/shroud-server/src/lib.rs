//! Shroud relay server
//!
//! TCP front end for [`shroud_core::ShuffleDispatcher`]. Clients stream
//! `Submit` frames; full batches are written as `Batch` frames to a single
//! analyzer connection.
//!
//! # Architecture
//!
//! ```text
//! clients ──TCP──► Relay (task per connection)
//!                    │ submit
//!                    ▼
//!              ShuffleDispatcher ──► ChannelAnalyzer ──mpsc──► forwarder ──TCP──► analyzer
//! ```
//!
//! The dispatcher calls [`ChannelAnalyzer`] while holding a policy's lock, so
//! batches enter the channel in threshold order. A single forwarder task
//! drains the channel, which keeps that order on the analyzer connection.
//!
//! On shutdown the relay stops accepting and stops every connection task,
//! which drops the last sender; the forwarder then writes out whatever full
//! batches are still queued, bounded by a drain timeout.
//!
//! # Security
//!
//! The relay never inspects ciphertexts and does not log peer addresses
//! alongside routing policies. Submission order is destroyed by the shuffle
//! before anything leaves the process.

pub mod config;
pub mod error;
pub mod forwarder;
pub mod framing;
pub mod relay;

pub use config::{Cli, ServerConfig};
pub use error::ServerError;
pub use forwarder::{Backlog, ChannelAnalyzer, forward_batches};
pub use framing::{read_frame, write_frame};
pub use relay::Relay;
