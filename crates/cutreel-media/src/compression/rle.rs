//! Run-length codec for low-res baseline frames.
//!
//! The stream is a sequence of control bytes:
//!
//! - `0x01..=0x7F` - copy that many literal bytes from the stream
//! - `0x80` - followed by a 16-bit LE count: skip that many output
//!   bytes, preserving whatever the buffer already holds (inter-frame
//!   delta)
//! - `0x81..=0xFF` - repeat the next byte `control & 0x7F` times
//! - `0x00` - end of stream
//!
//! Decompression writes into a caller-owned buffer so consecutive frames
//! can accumulate deltas in place.

use crate::{Error, Result};

/// Decompress a stream into `dest`, starting at offset zero.
///
/// The stream must terminate with the end marker at or before the end of
/// `dest`; writing past the buffer or running out of input is an error.
pub fn decompress(src: &[u8], dest: &mut [u8]) -> Result<()> {
    let mut read = 0usize;
    let mut write = 0usize;

    loop {
        let control = next_byte(src, &mut read)?;
        match control {
            0x00 => return Ok(()),
            0x80 => {
                let lo = next_byte(src, &mut read)?;
                let hi = next_byte(src, &mut read)?;
                let skip = usize::from(u16::from_le_bytes([lo, hi]));
                write = checked_advance(write, skip, dest.len())?;
            }
            0x01..=0x7F => {
                let count = usize::from(control);
                if read + count > src.len() {
                    return Err(Error::BufferUnderflow {
                        need: count,
                        have: src.len() - read,
                    });
                }
                let end = checked_advance(write, count, dest.len())?;
                dest[write..end].copy_from_slice(&src[read..read + count]);
                read += count;
                write = end;
            }
            _ => {
                let count = usize::from(control & 0x7F);
                let value = next_byte(src, &mut read)?;
                let end = checked_advance(write, count, dest.len())?;
                dest[write..end].fill(value);
                write = end;
            }
        }
    }
}

/// Compress `data` into a stream `decompress` reproduces exactly.
///
/// Runs of three or more equal bytes become repeat codes; everything
/// else is emitted as literal runs. No skip codes are produced - delta
/// encoding against a previous frame is the caller's concern.
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() / 2 + 2);
    let mut pos = 0usize;
    let mut literal_start = 0usize;

    while pos < data.len() {
        let run_value = data[pos];
        let mut run_len = 1usize;
        while pos + run_len < data.len() && data[pos + run_len] == run_value {
            run_len += 1;
        }
        if run_len >= 3 {
            flush_literals(&mut out, &data[literal_start..pos]);
            let mut remaining = run_len;
            while remaining > 0 {
                let chunk = remaining.min(0x7F);
                out.push(0x80 | chunk as u8);
                out.push(run_value);
                remaining -= chunk;
            }
            pos += run_len;
            literal_start = pos;
        } else {
            pos += run_len;
        }
    }
    flush_literals(&mut out, &data[literal_start..]);
    out.push(0x00);
    out
}

fn flush_literals(out: &mut Vec<u8>, literals: &[u8]) {
    for chunk in literals.chunks(0x7F) {
        out.push(chunk.len() as u8);
        out.extend_from_slice(chunk);
    }
}

fn next_byte(src: &[u8], read: &mut usize) -> Result<u8> {
    let value = src.get(*read).copied().ok_or(Error::BufferUnderflow {
        need: 1,
        have: 0,
    })?;
    *read += 1;
    Ok(value)
}

fn checked_advance(write: usize, count: usize, len: usize) -> Result<usize> {
    let end = write + count;
    if end > len {
        return Err(Error::decode(format!(
            "run-length output of {end} bytes overruns frame buffer of {len}"
        )));
    }
    Ok(end)
}
