//! Cutreel-Media: cutscene container parsing, serialization, and codecs
//!
//! This crate provides the container layer for cutreel. A cutscene movie
//! is one resource blob: a fixed header (video geometry, audio sample
//! rate, starting palette) followed by typed data entries on a shared
//! monotonic timestamp axis.
//!
//! # Modules
//!
//! - `timestamp` - fixed-point second/fraction movie timestamps
//! - `container` - the in-memory container model and entry types
//! - `reader` - raw resource bytes to a `Container`
//! - `writer` - a `Container` back to raw resource bytes
//! - `compression` - tile codecs: run-length frames, control-word
//!   tables, palette-lookup dictionaries
//!
//! # Architecture
//!
//! Reading is strict on framing and lenient on payloads: entry headers
//! that do not parse fail the whole container, while compressed payloads
//! stay raw bytes in their entries so a single undecodable frame can be
//! skipped later instead of rejecting the movie. Writing reproduces the
//! exact layout `reader` parses; a parse/serialize round trip is
//! byte-stable.

pub mod compression;
pub mod container;
pub mod error;
pub mod reader;
pub mod timestamp;
pub mod writer;

pub use container::{Bitmap, Container, Entry, EntryKind, Palette, SubtitleControl};
pub use error::{Error, Result};
pub use reader::read_container;
pub use timestamp::Timestamp;
pub use writer::write_container;
