//! Elliptic-curve primitives for the Shroud telemetry pipeline.
//!
//! Clients encrypt each measurement to the analyzer using a secret derived
//! from ECDH over a short-Weierstrass curve with `a = -3` (P-256 by default).
//! The shuffling relay forwards those ciphertexts without ever touching the
//! keys; this crate is used by the two endpoints of that channel.
//!
//! # Components
//!
//! - [`params`]: Immutable curve parameters ([`CurveParams`])
//! - [`point`]: Validated affine points and scalar multiplication
//! - [`codec`]: X9.62 compressed and uncompressed point encodings
//! - [`exchange`]: Key generation and shared-secret derivation
//! - [`error`]: Error types
//!
//! # Security
//!
//! [`CurveCodec::decode`] is the trust boundary. Every byte string received
//! from a peer must pass through it before any scalar multiplication, so that
//! off-curve points are rejected instead of leaking key bits through an
//! invalid-curve attack. [`KeyExchange`] does not re-validate its input.
//!
//! Arithmetic is built on arbitrary-precision integers and is not constant
//! time.

#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod exchange;
mod field;
pub mod params;
pub mod point;

pub use codec::{CompressedPoint, CurveCodec};
pub use error::{CurveError, Result};
pub use exchange::{KeyExchange, KeyPair, PrivateScalar, SharedSecret};
pub use params::CurveParams;
pub use point::CurvePoint;
