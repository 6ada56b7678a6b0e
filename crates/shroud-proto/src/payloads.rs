//! Batch payload encoding.
//!
//! ```text
//! [count: u32] ([len: u32] [ciphertext: len bytes]) * count
//! ```
//!
//! Entry order is the shuffled order and must be preserved exactly.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{FrameHeader, ProtocolError, Result};

const LEN_PREFIX: usize = 4;

/// Encode shuffled ciphertexts into a batch payload.
///
/// # Errors
///
/// Returns `PayloadTooLarge` if the encoded batch would not fit in a frame.
pub fn encode_batch(entries: &[Bytes]) -> Result<Bytes> {
    let size = LEN_PREFIX + entries.iter().map(|entry| LEN_PREFIX + entry.len()).sum::<usize>();
    if size > FrameHeader::MAX_PAYLOAD_SIZE {
        return Err(ProtocolError::PayloadTooLarge { size, max: FrameHeader::MAX_PAYLOAD_SIZE });
    }

    let mut buf = BytesMut::with_capacity(size);
    buf.put_u32(entries.len() as u32);
    for entry in entries {
        buf.put_u32(entry.len() as u32);
        buf.put_slice(entry);
    }
    Ok(buf.freeze())
}

/// Decode a batch payload. Entries share the payload's allocation.
///
/// # Errors
///
/// Returns `TruncatedBatch` if the count or any length prefix runs past the
/// end of the payload, and `TrailingBytes` if bytes remain after the last
/// entry.
pub fn decode_batch(payload: &Bytes) -> Result<Vec<Bytes>> {
    let mut cursor = payload.clone();
    if cursor.remaining() < LEN_PREFIX {
        return Err(ProtocolError::TruncatedBatch);
    }

    let count = cursor.get_u32() as usize;
    // Every entry needs at least its length prefix
    if count > cursor.remaining() / LEN_PREFIX {
        return Err(ProtocolError::TruncatedBatch);
    }

    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        if cursor.remaining() < LEN_PREFIX {
            return Err(ProtocolError::TruncatedBatch);
        }
        let len = cursor.get_u32() as usize;
        if cursor.remaining() < len {
            return Err(ProtocolError::TruncatedBatch);
        }
        entries.push(cursor.split_to(len));
    }

    if cursor.has_remaining() {
        return Err(ProtocolError::TrailingBytes(cursor.remaining()));
    }
    Ok(entries)
}
