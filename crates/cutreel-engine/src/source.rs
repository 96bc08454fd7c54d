//! Capability boundaries to the resource archive layer.
//!
//! The engine never touches storage formats itself; it fetches and
//! persists opaque byte blobs by key. Implementations are expected to
//! reject compound or multi-block resources with `InvalidContent`
//! before the bytes ever reach the container reader.

use crate::Result;
use cutreel_common::ResourceKey;

/// Supplies raw movie resource bytes.
pub trait ResourceSource {
    /// Fetch the single byte blob stored under `key`.
    ///
    /// Fails with `NotFound` when no resource exists, or
    /// `InvalidContent` when the resource is not a plain single-block
    /// movie.
    fn fetch(&self, key: ResourceKey) -> Result<Vec<u8>>;
}

/// Persists raw movie resource bytes.
pub trait ResourceStore {
    /// Store `data` as the resource under `key`, replacing any previous
    /// content.
    fn put(&mut self, key: ResourceKey, data: Vec<u8>) -> Result<()>;
}
