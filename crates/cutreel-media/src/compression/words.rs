//! Packed control-word tables.
//!
//! The tile decoder interprets frame bitstreams through a pre-shared
//! dictionary of 24-bit control words: a 4-bit repetition count and a
//! 20-bit parameter. On the wire the table is a `u32` word count followed
//! by 3 bytes per word, little-endian.

use crate::{Error, Result};

/// One 24-bit control word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlWord(u32);

impl ControlWord {
    /// Create a word from a repetition count and a parameter.
    ///
    /// Values beyond 4 and 20 bits respectively are masked off.
    pub fn new(count: u8, parameter: u32) -> Self {
        Self(u32::from(count & 0x0F) << 20 | (parameter & 0x000F_FFFF))
    }

    /// Repetition count (4 bits).
    pub fn count(self) -> u8 {
        (self.0 >> 20) as u8
    }

    /// Parameter value (20 bits).
    pub fn parameter(self) -> u32 {
        self.0 & 0x000F_FFFF
    }

    /// Raw 24-bit value.
    pub fn raw(self) -> u32 {
        self.0
    }

    fn to_bytes(self) -> [u8; 3] {
        let raw = self.0.to_le_bytes();
        [raw[0], raw[1], raw[2]]
    }

    fn from_bytes(bytes: [u8; 3]) -> Self {
        Self(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]))
    }
}

/// Pack a control-word table into its wire form.
pub fn pack(words: &[ControlWord]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + words.len() * 3);
    out.extend_from_slice(&(words.len() as u32).to_le_bytes());
    for word in words {
        out.extend_from_slice(&word.to_bytes());
    }
    out
}

/// Unpack a control-word table from its wire form.
pub fn unpack(data: &[u8]) -> Result<Vec<ControlWord>> {
    if data.len() < 4 {
        return Err(Error::BufferUnderflow {
            need: 4,
            have: data.len(),
        });
    }
    let count = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    let expected = 4 + count * 3;
    if data.len() != expected {
        return Err(Error::decode(format!(
            "control dictionary of {} bytes does not match declared count {count}",
            data.len()
        )));
    }
    let mut words = Vec::with_capacity(count);
    for chunk in data[4..].chunks_exact(3) {
        words.push(ControlWord::from_bytes([chunk[0], chunk[1], chunk[2]]));
    }
    Ok(words)
}
