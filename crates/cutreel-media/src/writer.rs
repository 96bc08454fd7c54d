//! Container writer: a `Container` back to raw resource bytes.
//!
//! Emits exactly the layout `reader` parses, so that writing a parsed
//! container reproduces an equivalent blob.

use crate::container::{Container, Entry, PALETTE_BYTES};
use crate::reader::{CONTAINER_TAG, HEADER_SIZE};
use crate::{Error, Result, Timestamp};
use bytes::{BufMut, BytesMut};

/// Serialize a container into resource bytes.
pub fn write_container(container: &Container) -> Result<Vec<u8>> {
    let payload_estimate: usize = container.entries.iter().map(entry_payload_hint).sum();
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload_estimate);

    buf.put_slice(&CONTAINER_TAG);
    buf.put_u16_le(container.video_width);
    buf.put_u16_le(container.video_height);
    buf.put_u16_le(container.audio_sample_rate);
    put_timestamp(&mut buf, container.end_timestamp);
    buf.put_u8(0); // pad
    buf.put_slice(&container.start_palette.0);

    for entry in &container.entries {
        write_entry(&mut buf, entry)?;
    }

    Ok(buf.to_vec())
}

fn write_entry(buf: &mut BytesMut, entry: &Entry) -> Result<()> {
    buf.put_u8(entry.kind() as u8);
    put_timestamp(buf, entry.timestamp());

    match entry {
        Entry::Palette { palette, .. } => {
            buf.put_u32_le(PALETTE_BYTES as u32);
            buf.put_slice(&palette.0);
        }
        Entry::PaletteReset { .. } => {
            buf.put_u32_le(0);
        }
        Entry::ControlDictionary { data, .. }
        | Entry::PaletteLookupList { data, .. }
        | Entry::LowResVideoFrame { data, .. } => {
            buf.put_u32_le(data.len() as u32);
            buf.put_slice(data);
        }
        Entry::HighResVideoFrame {
            bitstream,
            maskstream,
            ..
        } => {
            let pixel_data_offset = 2 + bitstream.len();
            if pixel_data_offset > usize::from(u16::MAX) {
                return Err(Error::invalid_container(format!(
                    "high-res bitstream of {} bytes does not fit the offset field",
                    bitstream.len()
                )));
            }
            buf.put_u32_le((pixel_data_offset + maskstream.len()) as u32);
            buf.put_u16_le(pixel_data_offset as u16);
            buf.put_slice(bitstream);
            buf.put_slice(maskstream);
        }
        Entry::Audio { samples, .. } => {
            buf.put_u32_le(samples.len() as u32);
            buf.put_slice(samples);
        }
        Entry::Subtitle { control, text, .. } => {
            buf.put_u32_le((8 + text.len()) as u32);
            buf.put_u32_le(control.0);
            buf.put_u32_le(8); // text offset
            buf.put_slice(text);
        }
    }
    Ok(())
}

fn entry_payload_hint(entry: &Entry) -> usize {
    8 + match entry {
        Entry::Palette { .. } => PALETTE_BYTES,
        Entry::PaletteReset { .. } => 0,
        Entry::ControlDictionary { data, .. }
        | Entry::PaletteLookupList { data, .. }
        | Entry::LowResVideoFrame { data, .. } => data.len(),
        Entry::HighResVideoFrame {
            bitstream,
            maskstream,
            ..
        } => 2 + bitstream.len() + maskstream.len(),
        Entry::Audio { samples, .. } => samples.len(),
        Entry::Subtitle { text, .. } => 8 + text.len(),
    }
}

fn put_timestamp(buf: &mut BytesMut, ts: Timestamp) {
    buf.put_u8(ts.second);
    buf.put_u16_le(ts.fraction);
}
