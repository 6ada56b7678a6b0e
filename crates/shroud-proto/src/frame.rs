//! Complete frames: header plus payload.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{FrameHeader, Opcode, ProtocolError, Result, payloads};

/// A header and its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Routing header
    pub header: FrameHeader,
    /// Opaque payload, `header.payload_len()` bytes
    pub payload: Bytes,
}

impl Frame {
    /// Submission of one ciphertext under a routing policy.
    ///
    /// # Errors
    ///
    /// Returns `PayloadTooLarge` if the ciphertext exceeds the frame limit.
    pub fn submit(metric_id: u32, day_index: u32, ciphertext: Bytes) -> Result<Self> {
        let header = FrameHeader::new(Opcode::Submit, metric_id, day_index, ciphertext.len())?;
        Ok(Self { header, payload: ciphertext })
    }

    /// One shuffled batch for a routing policy, entries in delivery order.
    ///
    /// # Errors
    ///
    /// Returns `PayloadTooLarge` if the encoded batch exceeds the frame limit.
    pub fn batch(metric_id: u32, day_index: u32, ciphertexts: &[Bytes]) -> Result<Self> {
        let payload = payloads::encode_batch(ciphertexts)?;
        let header = FrameHeader::new(Opcode::Batch, metric_id, day_index, payload.len())?;
        Ok(Self { header, payload })
    }

    /// Parse exactly one frame from `bytes`.
    ///
    /// # Errors
    ///
    /// Header errors from [`FrameHeader::from_bytes`], `FrameTooShort` if the
    /// payload is cut off, `TrailingBytes` if anything follows it.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let header = FrameHeader::from_bytes(bytes)?;
        let expected = FrameHeader::SIZE + header.payload_len();
        if bytes.len() < expected {
            return Err(ProtocolError::FrameTooShort { expected, actual: bytes.len() });
        }
        if bytes.len() > expected {
            return Err(ProtocolError::TrailingBytes(bytes.len() - expected));
        }

        let payload = Bytes::copy_from_slice(&bytes[FrameHeader::SIZE..]);
        Ok(Self { header, payload })
    }

    /// Append the wire encoding to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(FrameHeader::SIZE + self.payload.len());
        dst.put_slice(&self.header.to_bytes());
        dst.put_slice(&self.payload);
    }

    /// Wire encoding as a new buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        buf.freeze()
    }

    /// Frame opcode.
    ///
    /// # Errors
    ///
    /// Returns `UnknownOpcode` for a header that bypassed validation.
    pub fn opcode(&self) -> Result<Opcode> {
        self.header
            .opcode()
            .ok_or_else(|| ProtocolError::UnknownOpcode(self.header.to_bytes()[5]))
    }

    /// Decode the entries of a `Batch` frame.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedOpcode` for any other frame kind, or a batch payload
    /// error.
    pub fn batch_entries(&self) -> Result<Vec<Bytes>> {
        let opcode = self.opcode()?;
        if opcode != Opcode::Batch {
            return Err(ProtocolError::UnexpectedOpcode { expected: Opcode::Batch, actual: opcode });
        }
        payloads::decode_batch(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_frame_round_trip() {
        let frame = Frame::submit(3, 19_500, Bytes::from_static(b"opaque")).unwrap();
        let wire = frame.to_bytes();

        assert_eq!(wire.len(), FrameHeader::SIZE + 6);
        assert_eq!(Frame::decode(&wire).unwrap(), frame);
    }

    #[test]
    fn batch_frame_round_trip() {
        let entries = vec![Bytes::from_static(b"b"), Bytes::from_static(b"a")];
        let frame = Frame::batch(1, 2, &entries).unwrap();
        let decoded = Frame::decode(&frame.to_bytes()).unwrap();

        assert_eq!(decoded.opcode(), Ok(Opcode::Batch));
        assert_eq!(decoded.batch_entries().unwrap(), entries);
    }

    #[test]
    fn decode_checks_payload_length() {
        let wire = Frame::submit(1, 1, Bytes::from_static(b"abc")).unwrap().to_bytes();

        assert!(matches!(
            Frame::decode(&wire[..wire.len() - 1]),
            Err(ProtocolError::FrameTooShort { .. })
        ));

        let mut long = BytesMut::from(&wire[..]);
        long.put_u8(0);
        assert_eq!(Frame::decode(&long), Err(ProtocolError::TrailingBytes(1)));
    }

    #[test]
    fn submit_frame_has_no_batch_entries() {
        let frame = Frame::submit(1, 1, Bytes::new()).unwrap();
        assert_eq!(
            frame.batch_entries(),
            Err(ProtocolError::UnexpectedOpcode { expected: Opcode::Batch, actual: Opcode::Submit })
        );
    }
}
