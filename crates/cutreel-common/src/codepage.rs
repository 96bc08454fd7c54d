//! Single-byte text codec for subtitle payloads.
//!
//! Subtitle text in the container is stored as NUL-terminated single-byte
//! characters. The codec maps bytes to Unicode scalars one-to-one
//! (Latin-1); characters outside that range encode as `'?'`.

/// Fixed single-byte codepage codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Codepage;

impl Codepage {
    /// Decode bytes into text, stopping at the first NUL byte.
    pub fn decode(&self, bytes: &[u8]) -> String {
        bytes
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| char::from(b))
            .collect()
    }

    /// Encode text into bytes; unrepresentable characters become `'?'`.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        text.chars()
            .map(|c| {
                let value = u32::from(c);
                if value < 256 {
                    value as u8
                } else {
                    b'?'
                }
            })
            .collect()
    }
}
