//! Protocol error types.

use thiserror::Error;

use crate::Opcode;

/// Result alias for wire-format operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding or decoding frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Not enough bytes for a header or declared payload.
    #[error("frame too short: need {expected} bytes, have {actual}")]
    FrameTooShort {
        /// Bytes required
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Bytes left over after the declared payload.
    #[error("{0} trailing bytes after frame")]
    TrailingBytes(usize),

    /// Header does not start with the protocol magic.
    #[error("invalid magic: {0:#010x}")]
    InvalidMagic(u32),

    /// Protocol version is not supported.
    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u8),

    /// Opcode byte is not defined.
    #[error("unknown opcode {0}")]
    UnknownOpcode(u8),

    /// Reserved header bits are set.
    #[error("reserved header field is non-zero")]
    ReservedBitsSet,

    /// Frame has a valid opcode that is not allowed here.
    #[error("expected {expected:?} frame, got {actual:?}")]
    UnexpectedOpcode {
        /// Opcode the caller accepts
        expected: Opcode,
        /// Opcode received
        actual: Opcode,
    },

    /// Payload exceeds the protocol limit.
    #[error("payload of {size} bytes exceeds limit of {max}")]
    PayloadTooLarge {
        /// Payload size
        size: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Batch payload ends in the middle of an entry.
    #[error("truncated batch payload")]
    TruncatedBatch,
}
