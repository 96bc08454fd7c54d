//! The entry model: typed, timestamped records in a movie container.
//!
//! A container interleaves palette updates, the shared tile-compression
//! dictionary, per-frame pixel deltas, audio samples, and subtitles along
//! one non-decreasing timestamp axis. Consumers walk the entries in order
//! with an exhaustive match; nothing here reorders the stream.

use crate::Timestamp;
use cutreel_common::Language;

/// Number of color slots in a palette.
pub const PALETTE_COLORS: usize = 256;

/// Byte size of a raw palette (256 RGB triplets).
pub const PALETTE_BYTES: usize = PALETTE_COLORS * 3;

/// A 256-color RGB palette.
#[derive(Clone, PartialEq, Eq)]
pub struct Palette(pub [u8; PALETTE_BYTES]);

impl Palette {
    /// RGB triplet of the given color index.
    pub fn color(&self, index: u8) -> [u8; 3] {
        let at = usize::from(index) * 3;
        [self.0[at], self.0[at + 1], self.0[at + 2]]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self([0; PALETTE_BYTES])
    }
}

impl std::fmt::Debug for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Palette").finish_non_exhaustive()
    }
}

/// An 8-bit paletted pixel buffer with its own palette copy.
///
/// Bitmaps emitted during reconstruction are deep copies; they never alias
/// the live working buffer the decoder mutates in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
    /// `width * height` palette indices, row-major.
    pub pixels: Vec<u8>,
    /// Palette active at capture time.
    pub palette: Palette,
}

/// Subtitle control code, a four-byte tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SubtitleControl(pub u32);

impl SubtitleControl {
    /// Defines the on-screen display area for subtitles.
    pub const AREA: Self = Self::from_tag(*b"AREA");
    /// English subtitle text.
    pub const ENGLISH: Self = Self::from_tag(*b"STD ");
    /// French subtitle text.
    pub const FRENCH: Self = Self::from_tag(*b"FRN ");
    /// German subtitle text.
    pub const GERMAN: Self = Self::from_tag(*b"GER ");

    const fn from_tag(tag: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(tag))
    }

    /// Control code carrying subtitle text for the given language.
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::English => Self::ENGLISH,
            Language::French => Self::FRENCH,
            Language::German => Self::GERMAN,
        }
    }
}

impl std::fmt::Display for SubtitleControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in self.0.to_le_bytes() {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", char::from(b))?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

/// Discriminator of an entry variant, as stored on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum EntryKind {
    Palette = 0,
    PaletteReset = 1,
    ControlDictionary = 2,
    PaletteLookupList = 3,
    LowResVideoFrame = 4,
    HighResVideoFrame = 5,
    Audio = 6,
    Subtitle = 7,
}

impl EntryKind {
    /// Map a wire byte back to a kind.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Palette),
            1 => Some(Self::PaletteReset),
            2 => Some(Self::ControlDictionary),
            3 => Some(Self::PaletteLookupList),
            4 => Some(Self::LowResVideoFrame),
            5 => Some(Self::HighResVideoFrame),
            6 => Some(Self::Audio),
            7 => Some(Self::Subtitle),
            _ => None,
        }
    }
}

/// One typed, timestamped record in a container's linear stream.
///
/// Compressed payloads (`ControlDictionary`, `PaletteLookupList`, the
/// video frames) stay raw here; unpacking happens during reconstruction
/// so a malformed payload can be skipped without failing the parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Replaces the active palette; a scene boundary.
    Palette { at: Timestamp, palette: Palette },
    /// Restores the container's start palette.
    PaletteReset { at: Timestamp },
    /// Packed control-word table for the tile decoder.
    ControlDictionary { at: Timestamp, data: Vec<u8> },
    /// Shared palette-lookup buffer; a scene boundary.
    PaletteLookupList { at: Timestamp, data: Vec<u8> },
    /// Run-length compressed baseline frame.
    LowResVideoFrame { at: Timestamp, data: Vec<u8> },
    /// Tile-compressed displayed frame: bitstream plus maskstream.
    HighResVideoFrame {
        at: Timestamp,
        bitstream: Vec<u8>,
        maskstream: Vec<u8>,
    },
    /// Raw unsigned 8-bit mono samples.
    Audio { at: Timestamp, samples: Vec<u8> },
    /// Subtitle directive or text, in codepage bytes.
    Subtitle {
        at: Timestamp,
        control: SubtitleControl,
        text: Vec<u8>,
    },
}

impl Entry {
    /// Timestamp of this entry.
    pub fn timestamp(&self) -> Timestamp {
        match *self {
            Entry::Palette { at, .. }
            | Entry::PaletteReset { at }
            | Entry::ControlDictionary { at, .. }
            | Entry::PaletteLookupList { at, .. }
            | Entry::LowResVideoFrame { at, .. }
            | Entry::HighResVideoFrame { at, .. }
            | Entry::Audio { at, .. }
            | Entry::Subtitle { at, .. } => at,
        }
    }

    /// Variant discriminator.
    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Palette { .. } => EntryKind::Palette,
            Entry::PaletteReset { .. } => EntryKind::PaletteReset,
            Entry::ControlDictionary { .. } => EntryKind::ControlDictionary,
            Entry::PaletteLookupList { .. } => EntryKind::PaletteLookupList,
            Entry::LowResVideoFrame { .. } => EntryKind::LowResVideoFrame,
            Entry::HighResVideoFrame { .. } => EntryKind::HighResVideoFrame,
            Entry::Audio { .. } => EntryKind::Audio,
            Entry::Subtitle { .. } => EntryKind::Subtitle,
        }
    }
}

/// A parsed movie container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Video width in pixels.
    pub video_width: u16,
    /// Video height in pixels.
    pub video_height: u16,
    /// Audio sample rate in Hz.
    pub audio_sample_rate: u16,
    /// Palette active before the first `Palette` entry.
    pub start_palette: Palette,
    /// End of the whole movie; bounds the last scene and subtitle.
    pub end_timestamp: Timestamp,
    /// Entries ordered non-decreasing by timestamp.
    pub entries: Vec<Entry>,
}

impl Default for Container {
    /// Empty container with the format's standard geometry and rate.
    fn default() -> Self {
        Self {
            video_width: 600,
            video_height: 300,
            audio_sample_rate: 22050,
            start_palette: Palette::default(),
            end_timestamp: Timestamp::ZERO,
            entries: Vec::new(),
        }
    }
}
