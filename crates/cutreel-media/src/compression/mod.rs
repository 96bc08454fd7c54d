//! Tile-compression support for high-res video frames.
//!
//! High-res frames are split into 4x4 tiles; each tile references a
//! subset of the active palette through the shared palette-lookup buffer
//! and a pre-shared control-word dictionary. This module provides:
//!
//! - `rle` - run-length codec for low-res baseline frames
//! - `words` - packed control-word tables
//! - `lookup` - tile palette keys and the lookup dictionary generator
//! - `TileDecoder` - the capability boundary to the byte-oriented tile
//!   bitstream decoder, which is consumed here, not implemented

pub mod lookup;
pub mod rle;
pub mod words;

pub use lookup::{PaletteLookup, PaletteLookupGenerator, TileLookup, TilePaletteKey};
pub use words::ControlWord;

use crate::Result;

/// Side length of a tile in pixels.
pub const TILE_SIDE: usize = 4;

/// Number of pixels in one tile.
pub const PIXELS_PER_TILE: usize = TILE_SIDE * TILE_SIDE;

/// Palette indices of one tile, row-major.
pub type TileDelta = [u8; PIXELS_PER_TILE];

/// Configuration fed to the tile decoder, updated as the entry stream
/// delivers new dictionaries and lookup buffers.
#[derive(Debug, Clone, Default)]
pub struct DecoderConfig {
    /// Unpacked control-word dictionary.
    pub control_words: Vec<ControlWord>,
    /// Currently installed palette-lookup buffer.
    pub palette_lookup: Vec<u8>,
}

impl DecoderConfig {
    /// Replace the control-word dictionary.
    pub fn set_control_words(&mut self, words: Vec<ControlWord>) {
        self.control_words = words;
    }

    /// Install a new palette-lookup buffer.
    pub fn set_palette_lookup(&mut self, buffer: Vec<u8>) {
        self.palette_lookup = buffer;
    }
}

/// Mutable view of the working frame buffer a decode pass writes into.
pub struct FrameTarget<'a> {
    /// Frame width in pixels.
    pub width: usize,
    /// Frame height in pixels.
    pub height: usize,
    /// `width * height` palette indices, row-major.
    pub pixels: &'a mut [u8],
}

/// Capability to decode one high-res frame into a working buffer.
///
/// Given the current configuration and a frame's bitstream and
/// maskstream, an implementation updates the target in place. Errors
/// mean the single frame is undecodable; callers skip it and continue.
pub trait TileDecoder {
    /// Decode one frame's tile data into the target buffer.
    fn decode_frame(
        &self,
        config: &DecoderConfig,
        bitstream: &[u8],
        maskstream: &[u8],
        target: &mut FrameTarget<'_>,
    ) -> Result<()>;
}
