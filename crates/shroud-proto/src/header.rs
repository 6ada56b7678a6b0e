//! Fixed-size frame header.
//!
//! # Layout
//!
//! ```text
//! 0       4       5       6       8          12         16         20
//! | magic | ver   | op    | rsvd  | metric_id | day_index | payload_len |
//! ```
//!
//! All multi-byte fields are big-endian.

use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
    byteorder::{BigEndian, U16, U32},
};

use crate::{Opcode, ProtocolError, Result};

/// Header preceding every frame payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct FrameHeader {
    magic: U32<BigEndian>,
    version: u8,
    opcode: u8,
    reserved: U16<BigEndian>,
    metric_id: U32<BigEndian>,
    day_index: U32<BigEndian>,
    payload_len: U32<BigEndian>,
}

impl FrameHeader {
    /// Encoded header size.
    pub const SIZE: usize = 20;

    /// "SHFL"
    pub const MAGIC: u32 = 0x5348_464C;

    /// Current protocol version.
    pub const VERSION: u8 = 1;

    /// Largest payload any frame may carry (16 MB).
    pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

    /// Build a header for the current protocol version.
    ///
    /// # Errors
    ///
    /// Returns `PayloadTooLarge` if `payload_len` exceeds
    /// [`Self::MAX_PAYLOAD_SIZE`].
    pub fn new(opcode: Opcode, metric_id: u32, day_index: u32, payload_len: usize) -> Result<Self> {
        if payload_len > Self::MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                size: payload_len,
                max: Self::MAX_PAYLOAD_SIZE,
            });
        }

        Ok(Self {
            magic: U32::new(Self::MAGIC),
            version: Self::VERSION,
            opcode: opcode.to_u8(),
            reserved: U16::new(0),
            metric_id: U32::new(metric_id),
            day_index: U32::new(day_index),
            payload_len: U32::new(payload_len as u32),
        })
    }

    /// Parse and validate a header from the first [`Self::SIZE`] bytes.
    ///
    /// Any bytes after the header are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (header, _) = Self::read_from_prefix(bytes).map_err(|_| {
            ProtocolError::FrameTooShort { expected: Self::SIZE, actual: bytes.len() }
        })?;
        header.validate()?;
        Ok(header)
    }

    fn validate(&self) -> Result<()> {
        if self.magic.get() != Self::MAGIC {
            return Err(ProtocolError::InvalidMagic(self.magic.get()));
        }
        if self.version != Self::VERSION {
            return Err(ProtocolError::UnsupportedVersion(self.version));
        }
        if Opcode::from_u8(self.opcode).is_none() {
            return Err(ProtocolError::UnknownOpcode(self.opcode));
        }
        if self.reserved.get() != 0 {
            return Err(ProtocolError::ReservedBitsSet);
        }
        let payload_len = self.payload_len();
        if payload_len > Self::MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                size: payload_len,
                max: Self::MAX_PAYLOAD_SIZE,
            });
        }
        Ok(())
    }

    /// Serialize to wire bytes.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out.copy_from_slice(self.as_bytes());
        out
    }

    /// Frame opcode.
    ///
    /// Always `Some` for headers built by [`Self::new`] or
    /// [`Self::from_bytes`].
    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::from_u8(self.opcode)
    }

    /// Metric half of the routing policy.
    pub fn metric_id(&self) -> u32 {
        self.metric_id.get()
    }

    /// Day-index half of the routing policy.
    pub fn day_index(&self) -> u32 {
        self.day_index.get()
    }

    /// Declared payload length in bytes.
    pub fn payload_len(&self) -> usize {
        self.payload_len.get() as usize
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn header_layout_is_fixed() {
        let header = FrameHeader::new(Opcode::Submit, 7, 19_000, 0x0102).unwrap();
        assert_eq!(
            header.to_bytes(),
            hex!("5348464c" "01" "01" "0000" "00000007" "00004a38" "00000102")
        );
    }

    #[test]
    fn header_round_trip() {
        let header = FrameHeader::new(Opcode::Batch, 42, 3, 512).unwrap();
        let parsed = FrameHeader::from_bytes(&header.to_bytes()).unwrap();

        assert_eq!(parsed, header);
        assert_eq!(parsed.opcode(), Some(Opcode::Batch));
        assert_eq!(parsed.metric_id(), 42);
        assert_eq!(parsed.day_index(), 3);
        assert_eq!(parsed.payload_len(), 512);
    }

    #[test]
    fn rejects_short_input() {
        let result = FrameHeader::from_bytes(&[0u8; 19]);
        assert_eq!(result, Err(ProtocolError::FrameTooShort { expected: 20, actual: 19 }));
    }

    #[test]
    fn rejects_bad_magic_version_and_opcode() {
        let good = FrameHeader::new(Opcode::Submit, 1, 1, 0).unwrap().to_bytes();

        let mut bad = good;
        bad[0] = b'X';
        assert!(matches!(FrameHeader::from_bytes(&bad), Err(ProtocolError::InvalidMagic(_))));

        let mut bad = good;
        bad[4] = 2;
        assert_eq!(FrameHeader::from_bytes(&bad), Err(ProtocolError::UnsupportedVersion(2)));

        let mut bad = good;
        bad[5] = 9;
        assert_eq!(FrameHeader::from_bytes(&bad), Err(ProtocolError::UnknownOpcode(9)));

        let mut bad = good;
        bad[7] = 1;
        assert_eq!(FrameHeader::from_bytes(&bad), Err(ProtocolError::ReservedBitsSet));
    }

    #[test]
    fn rejects_oversized_payload() {
        assert!(matches!(
            FrameHeader::new(Opcode::Submit, 0, 0, FrameHeader::MAX_PAYLOAD_SIZE + 1),
            Err(ProtocolError::PayloadTooLarge { .. })
        ));

        let mut bytes = FrameHeader::new(Opcode::Submit, 0, 0, 0).unwrap().to_bytes();
        bytes[16..20].copy_from_slice(&u32::MAX.to_be_bytes());
        assert!(matches!(
            FrameHeader::from_bytes(&bytes),
            Err(ProtocolError::PayloadTooLarge { .. })
        ));
    }
}
