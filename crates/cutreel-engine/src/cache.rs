//! The movie cache: parsed containers and their derived views, by key.
//!
//! Each key's `CachedMovie` holds the immutable parsed container plus
//! lazily computed audio, scenes, and per-language subtitles. Derived
//! state is cleared only by whole-key eviction; there is no partial
//! invalidation. The cache does not synchronize internally - the
//! `&mut self` surface makes single-writer access explicit, and callers
//! that share a cache across threads serialize around it.

use crate::audio::{reconstruct_audio, AudioTrack};
use crate::scenes::{reconstruct_scenes, Scene};
use crate::source::ResourceSource;
use crate::subtitles::{reconstruct_subtitles, Subtitles};
use crate::{Error, Result};
use cutreel_common::{Codepage, Language, ResourceId, ResourceKey};
use cutreel_media::compression::TileDecoder;
use cutreel_media::{read_container, Container};
use std::collections::HashMap;
use tracing::debug;

/// Per-key derived state: the parsed container and its lazy views.
struct CachedMovie {
    container: Container,
    sound: Option<AudioTrack>,
    scenes: Option<Vec<Scene>>,
    subtitles_by_lang: HashMap<Language, Subtitles>,
}

impl CachedMovie {
    fn new(container: Container) -> Self {
        Self {
            container,
            sound: None,
            scenes: None,
            subtitles_by_lang: HashMap::new(),
        }
    }

    fn audio(&mut self) -> &AudioTrack {
        self.sound
            .get_or_insert_with(|| reconstruct_audio(&self.container))
    }

    fn video(&mut self, decoder: &impl TileDecoder) -> &[Scene] {
        self.scenes
            .get_or_insert_with(|| reconstruct_scenes(&self.container, decoder))
    }

    fn subtitles(&mut self, codepage: Codepage, language: Language) -> &Subtitles {
        self.subtitles_by_lang
            .entry(language)
            .or_insert_with(|| reconstruct_subtitles(&self.container, codepage, language))
    }
}

/// Retrieves movie containers from a resource source and keeps them
/// decoded until they are invalidated.
pub struct MovieCache<S, D> {
    codepage: Codepage,
    source: S,
    decoder: D,
    movies: HashMap<ResourceKey, CachedMovie>,
}

impl<S: ResourceSource, D: TileDecoder> MovieCache<S, D> {
    /// Create an empty cache over the given source and tile decoder.
    pub fn new(codepage: Codepage, source: S, decoder: D) -> Self {
        Self {
            codepage,
            source,
            decoder,
            movies: HashMap::new(),
        }
    }

    /// Drop every cached movie whose key names one of the given ids.
    ///
    /// The next access for an affected key recomputes everything from
    /// raw resource bytes.
    pub fn invalidate_resources(&mut self, ids: &[ResourceId]) {
        self.movies.retain(|key, _| {
            let keep = !ids.contains(&key.id);
            if !keep {
                debug!(key = %key, "evicting cached movie");
            }
            keep
        });
    }

    /// Drop one key's cached movie, if present.
    pub fn evict(&mut self, key: ResourceKey) {
        if self.movies.remove(&key).is_some() {
            debug!(key = %key, "evicting cached movie");
        }
    }

    /// The parsed container for the key.
    pub fn container(&mut self, key: ResourceKey) -> Result<&Container> {
        Ok(&self.ensure(key)?.container)
    }

    /// The movie's linear audio track.
    pub fn audio(&mut self, key: ResourceKey) -> Result<&AudioTrack> {
        Ok(self.ensure(key)?.audio())
    }

    /// The movie's reconstructed video scenes.
    pub fn video(&mut self, key: ResourceKey) -> Result<&[Scene]> {
        self.ensure(key)?;
        let Self {
            decoder, movies, ..
        } = self;
        match movies.get_mut(&key) {
            Some(cached) => Ok(cached.video(decoder)),
            None => Err(Error::NotFound(key)),
        }
    }

    /// The movie's subtitles for one language.
    pub fn subtitles(&mut self, key: ResourceKey, language: Language) -> Result<&Subtitles> {
        let codepage = self.codepage;
        Ok(self.ensure(key)?.subtitles(codepage, language))
    }

    /// Resolve the key's cached movie, populating it on first access.
    ///
    /// Fetch or parse failures leave the cache unchanged.
    fn ensure(&mut self, key: ResourceKey) -> Result<&mut CachedMovie> {
        use std::collections::hash_map::Entry::{Occupied, Vacant};
        match self.movies.entry(key) {
            Occupied(slot) => Ok(slot.into_mut()),
            Vacant(slot) => {
                let data = self.source.fetch(key)?;
                let container = read_container(&data)?;
                debug!(key = %key, entries = container.entries.len(), "caching parsed movie");
                Ok(slot.insert(CachedMovie::new(container)))
            }
        }
    }
}
