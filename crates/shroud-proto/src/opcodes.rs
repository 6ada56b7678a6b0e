//! Frame opcodes.

/// Kind of frame, stored in byte 5 of the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Client to relay: one ciphertext for a routing policy.
    Submit = 0x01,
    /// Relay to analyzer: one shuffled batch for a routing policy.
    Batch = 0x02,
}

impl Opcode {
    /// Parse an opcode byte.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Submit),
            0x02 => Some(Self::Batch),
            _ => None,
        }
    }

    /// Opcode byte.
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}
