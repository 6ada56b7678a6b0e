//! Wire format for the Shroud shuffling relay.
//!
//! Every frame is a fixed 20-byte big-endian header followed by an opaque
//! payload. Clients send `Submit` frames carrying one ciphertext; the relay
//! sends `Batch` frames carrying one shuffled batch to the analyzer.
//!
//! The header holds only what the relay needs to route: the routing policy
//! (metric and day index) and the payload length. Nothing identifying the
//! sender is ever put on the wire towards the analyzer.
//!
//! # Security
//!
//! Header parsing uses compile-time verified layouts via `zerocopy`. Payloads
//! are capped at 16 MB and batch entry counts are checked against the bytes
//! actually present before anything is allocated.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod errors;
pub mod frame;
pub mod header;
pub mod opcodes;
pub mod payloads;

pub use errors::{ProtocolError, Result};
pub use frame::Frame;
pub use header::FrameHeader;
pub use opcodes::Opcode;
pub use payloads::{decode_batch, encode_batch};
