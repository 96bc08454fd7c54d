//! Cutreel-Engine: movie cache, reconstruction, and splice edits
//!
//! The consumer-facing layer over the container format. Raw resource
//! bytes come from a `ResourceSource`; parsed containers and their
//! derived views are memoized per key until invalidated; edits rewrite
//! the entry stream and persist through a `ResourceStore`.
//!
//! # Modules
//!
//! - `source` - capability traits to the resource archive layer
//! - `cache` - per-key memoization with resource-level invalidation
//! - `scenes` - video scene reconstruction over the tile decoder
//! - `audio` - linear audio reconstruction
//! - `subtitles` - per-language subtitle reconstruction
//! - `edit` - audio and subtitle splice edits
//!
//! # Concurrency
//!
//! Everything here runs synchronously in the calling thread; derived
//! views are computed on first request. The cache takes `&mut self` and
//! does not synchronize internally - callers sharing one cache across
//! threads serialize access around it.

pub mod audio;
pub mod cache;
pub mod edit;
pub mod error;
pub mod scenes;
pub mod source;
pub mod subtitles;

pub use audio::AudioTrack;
pub use cache::MovieCache;
pub use edit::MovieEditService;
pub use error::{Error, Result};
pub use scenes::{Frame, Scene};
pub use source::{ResourceSource, ResourceStore};
pub use subtitles::{SubtitleCue, Subtitles};
