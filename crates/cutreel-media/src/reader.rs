//! Container reader: raw resource bytes to a parsed `Container`.

use crate::container::{
    Container, Entry, EntryKind, Palette, SubtitleControl, PALETTE_BYTES,
};
use crate::{Error, Result, Timestamp};

/// Magic tag at the start of every container blob.
pub const CONTAINER_TAG: [u8; 4] = *b"CUTS";

/// Fixed header size: tag, geometry, rate, end timestamp, pad, palette.
pub const HEADER_SIZE: usize = 4 + 2 + 2 + 2 + 3 + 1 + PALETTE_BYTES;

/// Per-entry record header: kind, timestamp, payload length.
const ENTRY_HEADER_SIZE: usize = 1 + 3 + 4;

/// Maximum allowed entry payload size to prevent OOM on malformed blobs.
const MAX_ENTRY_PAYLOAD: usize = 16 * 1024 * 1024;

/// Parse a container from raw resource bytes.
pub fn read_container(data: &[u8]) -> Result<Container> {
    if data.len() < HEADER_SIZE {
        return Err(Error::BufferUnderflow {
            need: HEADER_SIZE,
            have: data.len(),
        });
    }
    if data[0..4] != CONTAINER_TAG {
        return Err(Error::invalid_container("bad magic tag"));
    }

    let video_width = read_u16(data, 4);
    let video_height = read_u16(data, 6);
    let audio_sample_rate = read_u16(data, 8);
    let end_timestamp = read_timestamp(data, 10);
    // data[13] is a pad byte
    let mut palette = [0u8; PALETTE_BYTES];
    palette.copy_from_slice(&data[14..14 + PALETTE_BYTES]);

    let mut entries = Vec::new();
    let mut pos = HEADER_SIZE;
    while pos < data.len() {
        let (entry, next) = read_entry(data, pos)?;
        entries.push(entry);
        pos = next;
    }

    Ok(Container {
        video_width,
        video_height,
        audio_sample_rate,
        start_palette: Palette(palette),
        end_timestamp,
        entries,
    })
}

fn read_entry(data: &[u8], pos: usize) -> Result<(Entry, usize)> {
    let remaining = data.len() - pos;
    if remaining < ENTRY_HEADER_SIZE {
        return Err(Error::BufferUnderflow {
            need: ENTRY_HEADER_SIZE,
            have: remaining,
        });
    }

    let kind = EntryKind::from_u8(data[pos])
        .ok_or_else(|| Error::invalid_container(format!("unknown entry kind {}", data[pos])))?;
    let at = read_timestamp(data, pos + 1);
    let payload_len = read_u32(data, pos + 4) as usize;
    if payload_len > MAX_ENTRY_PAYLOAD {
        return Err(Error::invalid_container(format!(
            "entry payload of {payload_len} bytes exceeds maximum {MAX_ENTRY_PAYLOAD}"
        )));
    }

    let payload_start = pos + ENTRY_HEADER_SIZE;
    let payload_end = payload_start + payload_len;
    if payload_end > data.len() {
        return Err(Error::BufferUnderflow {
            need: payload_len,
            have: data.len() - payload_start,
        });
    }
    let payload = &data[payload_start..payload_end];

    let entry = match kind {
        EntryKind::Palette => {
            if payload.len() != PALETTE_BYTES {
                return Err(Error::invalid_container(format!(
                    "palette entry payload is {} bytes, expected {PALETTE_BYTES}",
                    payload.len()
                )));
            }
            let mut raw = [0u8; PALETTE_BYTES];
            raw.copy_from_slice(payload);
            Entry::Palette {
                at,
                palette: Palette(raw),
            }
        }
        EntryKind::PaletteReset => Entry::PaletteReset { at },
        EntryKind::ControlDictionary => Entry::ControlDictionary {
            at,
            data: payload.to_vec(),
        },
        EntryKind::PaletteLookupList => Entry::PaletteLookupList {
            at,
            data: payload.to_vec(),
        },
        EntryKind::LowResVideoFrame => Entry::LowResVideoFrame {
            at,
            data: payload.to_vec(),
        },
        EntryKind::HighResVideoFrame => {
            if payload.len() < 2 {
                return Err(Error::BufferUnderflow {
                    need: 2,
                    have: payload.len(),
                });
            }
            let pixel_data_offset = usize::from(u16::from_le_bytes([payload[0], payload[1]]));
            if pixel_data_offset < 2 || pixel_data_offset > payload.len() {
                return Err(Error::invalid_container(format!(
                    "high-res pixel data offset {pixel_data_offset} out of range"
                )));
            }
            Entry::HighResVideoFrame {
                at,
                bitstream: payload[2..pixel_data_offset].to_vec(),
                maskstream: payload[pixel_data_offset..].to_vec(),
            }
        }
        EntryKind::Audio => Entry::Audio {
            at,
            samples: payload.to_vec(),
        },
        EntryKind::Subtitle => {
            if payload.len() < 8 {
                return Err(Error::BufferUnderflow {
                    need: 8,
                    have: payload.len(),
                });
            }
            let control = SubtitleControl(read_u32(payload, 0));
            let text_offset = read_u32(payload, 4) as usize;
            if text_offset < 8 || text_offset > payload.len() {
                return Err(Error::invalid_container(format!(
                    "subtitle text offset {text_offset} out of range"
                )));
            }
            Entry::Subtitle {
                at,
                control,
                text: payload[text_offset..].to_vec(),
            }
        }
    };

    Ok((entry, payload_end))
}

fn read_u16(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

fn read_timestamp(data: &[u8], at: usize) -> Timestamp {
    Timestamp::new(data[at], u16::from_le_bytes([data[at + 1], data[at + 2]]))
}
