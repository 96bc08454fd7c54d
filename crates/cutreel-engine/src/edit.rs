//! Rewriting a container's entry stream: audio and subtitle splices.
//!
//! Both edits follow the same shape: fetch the current container (or an
//! empty base when the key holds nothing yet), drop the entries being
//! replaced, stable-merge the replacements back in by timestamp,
//! serialize through the store, and evict the cache key so the next
//! access reparses the stored bytes.

use crate::audio::AudioTrack;
use crate::cache::MovieCache;
use crate::scenes::Scene;
use crate::source::{ResourceSource, ResourceStore};
use crate::subtitles::Subtitles;
use crate::Result;
use cutreel_common::{Codepage, Language, ResourceId, ResourceKey};
use cutreel_media::compression::TileDecoder;
use cutreel_media::{
    write_container, Container, Entry, EntryKind, SubtitleControl, Timestamp,
};
use tracing::debug;

/// Samples per audio entry when re-chunking a replacement track.
const AUDIO_ENTRY_SIZE: usize = 0x2000;

/// Display-area directive synthesized when a container gains its first
/// subtitles. The engine honors any area, but only a strip below the
/// frame avoids having the text overdrawn by video, so the value is
/// fixed rather than editable.
const SUBTITLE_AREA_TEXT: &str = "20 365 620 395 CLR";

/// Read/write access to movies: the cache's views plus splice edits.
pub struct MovieEditService<S, D> {
    codepage: Codepage,
    cache: MovieCache<S, D>,
}

impl<S: ResourceSource, D: TileDecoder> MovieEditService<S, D> {
    /// Wrap a cache for editing.
    pub fn new(codepage: Codepage, cache: MovieCache<S, D>) -> Self {
        Self { codepage, cache }
    }

    /// The parsed container for the key.
    pub fn container(&mut self, key: ResourceKey) -> Result<&Container> {
        self.cache.container(key)
    }

    /// The movie's linear audio track.
    pub fn audio(&mut self, key: ResourceKey) -> Result<&AudioTrack> {
        self.cache.audio(key)
    }

    /// The movie's reconstructed video scenes.
    pub fn video(&mut self, key: ResourceKey) -> Result<&[Scene]> {
        self.cache.video(key)
    }

    /// The movie's subtitles for one language.
    pub fn subtitles(&mut self, key: ResourceKey, language: Language) -> Result<&Subtitles> {
        self.cache.subtitles(key, language)
    }

    /// Forward resource-change notifications to the cache.
    pub fn invalidate_resources(&mut self, ids: &[ResourceId]) {
        self.cache.invalidate_resources(ids);
    }

    /// Replace the movie's audio track.
    ///
    /// Existing audio entries are dropped; the new samples are chunked
    /// into entries with offset-derived timestamps and merged back in.
    /// The container's sample rate follows the new track and the end
    /// timestamp extends when the audio outlasts the movie.
    pub fn set_audio(
        &mut self,
        store: &mut dyn ResourceStore,
        key: ResourceKey,
        samples: &[u8],
        sample_rate: f32,
    ) -> Result<()> {
        let mut container = self.base_container(key);
        let retained: Vec<Entry> = container
            .entries
            .drain(..)
            .filter(|entry| entry.kind() != EntryKind::Audio)
            .collect();

        let mut audio_entries = Vec::with_capacity(samples.len() / AUDIO_ENTRY_SIZE + 1);
        for (index, chunk) in samples.chunks(AUDIO_ENTRY_SIZE).enumerate() {
            let offset = index * AUDIO_ENTRY_SIZE;
            audio_entries.push(Entry::Audio {
                at: Timestamp::from_seconds(offset as f32 / sample_rate),
                samples: chunk.to_vec(),
            });
        }
        let audio_end = Timestamp::from_seconds(samples.len() as f32 / sample_rate);

        container.entries = merge_by_timestamp(retained, audio_entries);
        container.audio_sample_rate = sample_rate as u16;
        if audio_end.is_after(container.end_timestamp) {
            container.end_timestamp = audio_end;
        }

        debug!(key = %key, samples = samples.len(), "replacing audio track");
        self.persist(store, key, &container)
    }

    /// Replace the movie's subtitles for one language.
    ///
    /// Existing cues with the language's control code are dropped. New
    /// cues merge in after the display-area directive (synthesized at
    /// time zero when the container has none) and only before entries
    /// that are not audio or palette changes, so cue timing never
    /// interleaves with the decode-critical stream.
    pub fn set_subtitles(
        &mut self,
        store: &mut dyn ResourceStore,
        key: ResourceKey,
        language: Language,
        subtitles: &Subtitles,
    ) -> Result<()> {
        let control = SubtitleControl::for_language(language);
        let mut container = self.base_container(key);

        let mut area_index: Option<usize> = None;
        let mut retained: Vec<Entry> = Vec::with_capacity(container.entries.len());
        for entry in container.entries.drain(..) {
            if let Entry::Subtitle {
                control: found, ..
            } = &entry
            {
                if *found == control {
                    continue;
                }
                if *found == SubtitleControl::AREA {
                    area_index = Some(retained.len());
                }
            }
            retained.push(entry);
        }

        let mut merged: Vec<Entry> = Vec::with_capacity(retained.len() + subtitles.cues.len() + 1);
        if area_index.is_none() {
            merged.push(Entry::Subtitle {
                at: Timestamp::ZERO,
                control: SubtitleControl::AREA,
                text: self.codepage.encode(SUBTITLE_AREA_TEXT),
            });
        }

        let mut pending = subtitles.cues.iter().peekable();
        for (index, entry) in retained.into_iter().enumerate() {
            let past_area = area_index.map_or(true, |area| index > area);
            let splice_point = past_area
                && !matches!(
                    entry.kind(),
                    EntryKind::Audio | EntryKind::Palette | EntryKind::PaletteReset
                );
            if splice_point {
                while pending
                    .peek()
                    .is_some_and(|cue| !cue.at.is_after(entry.timestamp()))
                {
                    if let Some(cue) = pending.next() {
                        merged.push(Entry::Subtitle {
                            at: cue.at,
                            control,
                            text: self.codepage.encode(&cue.text),
                        });
                    }
                }
            }
            merged.push(entry);
        }
        for cue in pending {
            merged.push(Entry::Subtitle {
                at: cue.at,
                control,
                text: self.codepage.encode(&cue.text),
            });
        }

        container.entries = merged;
        debug!(key = %key, language = %language, cues = subtitles.cues.len(), "replacing subtitles");
        self.persist(store, key, &container)
    }

    /// The current container for the key, or an empty standard-geometry
    /// base when the key holds no valid movie yet.
    fn base_container(&mut self, key: ResourceKey) -> Container {
        match self.cache.container(key) {
            Ok(container) => container.clone(),
            Err(_) => Container::default(),
        }
    }

    fn persist(
        &mut self,
        store: &mut dyn ResourceStore,
        key: ResourceKey,
        container: &Container,
    ) -> Result<()> {
        let data = write_container(container)?;
        store.put(key, data)?;
        self.cache.evict(key);
        Ok(())
    }
}

/// Stable merge: each insert goes before the first base entry whose
/// timestamp it does not exceed; leftovers append at the end.
fn merge_by_timestamp(base: Vec<Entry>, inserts: Vec<Entry>) -> Vec<Entry> {
    let mut merged = Vec::with_capacity(base.len() + inserts.len());
    let mut pending = inserts.into_iter().peekable();
    for entry in base {
        while let Some(next) = pending.peek() {
            if next.timestamp().is_after(entry.timestamp()) {
                break;
            }
            if let Some(next) = pending.next() {
                merged.push(next);
            }
        }
        merged.push(entry);
    }
    merged.extend(pending);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutreel_media::compression::{DecoderConfig, FrameTarget};
    use cutreel_media::read_container;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    struct NullDecoder;

    impl TileDecoder for NullDecoder {
        fn decode_frame(
            &self,
            _config: &DecoderConfig,
            _bitstream: &[u8],
            _maskstream: &[u8],
            _target: &mut FrameTarget<'_>,
        ) -> cutreel_media::Result<()> {
            Ok(())
        }
    }

    /// In-memory archive shared between the cache's source side and the
    /// store side of an edit, like the real resource layer.
    #[derive(Default, Clone)]
    struct MemoryArchive {
        blobs: Rc<RefCell<HashMap<ResourceKey, Vec<u8>>>>,
    }

    impl ResourceSource for MemoryArchive {
        fn fetch(&self, key: ResourceKey) -> Result<Vec<u8>> {
            self.blobs
                .borrow()
                .get(&key)
                .cloned()
                .ok_or(crate::Error::NotFound(key))
        }
    }

    impl ResourceStore for MemoryArchive {
        fn put(&mut self, key: ResourceKey, data: Vec<u8>) -> Result<()> {
            self.blobs.borrow_mut().insert(key, data);
            Ok(())
        }
    }

    fn movie_key() -> ResourceKey {
        ResourceKey::new(ResourceId(100), Language::English, 0)
    }

    fn service_over(
        container: Option<&Container>,
    ) -> (MovieEditService<MemoryArchive, NullDecoder>, MemoryArchive) {
        let archive = MemoryArchive::default();
        if let Some(container) = container {
            let data = write_container(container).unwrap();
            archive.blobs.borrow_mut().insert(movie_key(), data);
        }
        let cache = MovieCache::new(Codepage, archive.clone(), NullDecoder);
        (MovieEditService::new(Codepage, cache), archive)
    }

    fn kinds(container: &Container) -> Vec<EntryKind> {
        container.entries.iter().map(Entry::kind).collect()
    }

    #[test]
    fn test_set_audio_round_trips_samples() {
        let (mut service, mut archive) = service_over(None);
        let samples: Vec<u8> = (0..0x5000u32).map(|i| (i % 251) as u8).collect();

        service
            .set_audio(&mut archive, movie_key(), &samples, 22050.0)
            .unwrap();

        let track = service.audio(movie_key()).unwrap();
        assert_eq!(track.samples, samples);
        assert_eq!(track.sample_rate, 22050.0);

        // 0x5000 bytes chunk into two full entries and one partial.
        let container = service.container(movie_key()).unwrap();
        assert_eq!(container.entries.len(), 3);
        assert_eq!(
            container.end_timestamp,
            Timestamp::from_seconds(samples.len() as f32 / 22050.0)
        );
    }

    #[test]
    fn test_set_audio_replaces_only_audio() {
        let base = Container {
            end_timestamp: Timestamp::new(10, 0),
            entries: vec![
                Entry::Audio {
                    at: Timestamp::ZERO,
                    samples: vec![9; 64],
                },
                Entry::Subtitle {
                    at: Timestamp::new(1, 0),
                    control: SubtitleControl::ENGLISH,
                    text: b"Keep me".to_vec(),
                },
            ],
            ..Container::default()
        };
        let (mut service, mut archive) = service_over(Some(&base));

        service
            .set_audio(&mut archive, movie_key(), &[1, 2, 3], 22050.0)
            .unwrap();

        let track = service.audio(movie_key()).unwrap();
        assert_eq!(track.samples, vec![1, 2, 3]);
        let subs = service
            .subtitles(movie_key(), Language::English)
            .unwrap()
            .clone();
        assert_eq!(subs.cues[0].text, "Keep me");
        // Shorter audio never shrinks the movie.
        let container = service.container(movie_key()).unwrap();
        assert_eq!(container.end_timestamp, Timestamp::new(10, 0));
    }

    #[test]
    fn test_set_subtitles_synthesizes_area_entry() {
        let (mut service, mut archive) = service_over(None);
        let mut cues = Subtitles::default();
        cues.add(Timestamp::new(1, 0), "Hello");
        cues.add(Timestamp::new(2, 0), "World");

        service
            .set_subtitles(&mut archive, movie_key(), Language::English, &cues)
            .unwrap();

        let stored = archive.blobs.borrow().get(&movie_key()).cloned().unwrap();
        let container = read_container(&stored).unwrap();
        match &container.entries[0] {
            Entry::Subtitle { control, text, .. } => {
                assert_eq!(*control, SubtitleControl::AREA);
                assert_eq!(text, &Codepage.encode(SUBTITLE_AREA_TEXT));
            }
            other => panic!("expected area entry, got {other:?}"),
        }

        let subs = service
            .subtitles(movie_key(), Language::English)
            .unwrap()
            .clone();
        assert_eq!(subs.cues[0].text, "Hello");
        assert_eq!(subs.cues[1].text, "World");
    }

    #[test]
    fn test_set_subtitles_keeps_other_languages() {
        let base = Container {
            end_timestamp: Timestamp::new(5, 0),
            entries: vec![
                Entry::Subtitle {
                    at: Timestamp::ZERO,
                    control: SubtitleControl::AREA,
                    text: Codepage.encode(SUBTITLE_AREA_TEXT),
                },
                Entry::Subtitle {
                    at: Timestamp::new(1, 0),
                    control: SubtitleControl::FRENCH,
                    text: b"Bonjour".to_vec(),
                },
                Entry::Subtitle {
                    at: Timestamp::new(1, 0),
                    control: SubtitleControl::ENGLISH,
                    text: b"Old".to_vec(),
                },
            ],
            ..Container::default()
        };
        let (mut service, mut archive) = service_over(Some(&base));

        let mut cues = Subtitles::default();
        cues.add(Timestamp::new(2, 0), "New");
        service
            .set_subtitles(&mut archive, movie_key(), Language::English, &cues)
            .unwrap();

        let french = service
            .subtitles(movie_key(), Language::French)
            .unwrap()
            .clone();
        assert_eq!(french.cues[0].text, "Bonjour");
        let english = service
            .subtitles(movie_key(), Language::English)
            .unwrap()
            .clone();
        assert_eq!(english.cues.len(), 2);
        assert_eq!(english.cues[0].text, "New");
    }

    #[test]
    fn test_subtitles_never_splice_before_audio_or_palette() {
        let base = Container {
            end_timestamp: Timestamp::new(5, 0),
            entries: vec![
                Entry::Subtitle {
                    at: Timestamp::ZERO,
                    control: SubtitleControl::AREA,
                    text: Codepage.encode(SUBTITLE_AREA_TEXT),
                },
                Entry::Audio {
                    at: Timestamp::ZERO,
                    samples: vec![0; 16],
                },
                Entry::ControlDictionary {
                    at: Timestamp::new(1, 0),
                    data: vec![0, 0, 0, 0],
                },
            ],
            ..Container::default()
        };
        let (mut service, mut archive) = service_over(Some(&base));

        let mut cues = Subtitles::default();
        cues.add(Timestamp::ZERO, "Hi");
        service
            .set_subtitles(&mut archive, movie_key(), Language::English, &cues)
            .unwrap();

        let container = service.container(movie_key()).unwrap();
        assert_eq!(
            kinds(container),
            vec![
                EntryKind::Subtitle,
                EntryKind::Audio,
                EntryKind::Subtitle,
                EntryKind::ControlDictionary,
            ]
        );
    }

    #[test]
    fn test_merge_by_timestamp_is_stable() {
        let sub = |second: u8| Entry::Subtitle {
            at: Timestamp::new(second, 0),
            control: SubtitleControl::ENGLISH,
            text: Vec::new(),
        };
        let audio = |second: u8| Entry::Audio {
            at: Timestamp::new(second, 0),
            samples: Vec::new(),
        };
        let merged = merge_by_timestamp(
            vec![sub(1), sub(3)],
            vec![audio(0), audio(1), audio(5)],
        );
        let times: Vec<(EntryKind, u8)> = merged
            .iter()
            .map(|e| (e.kind(), e.timestamp().second))
            .collect();
        assert_eq!(
            times,
            vec![
                (EntryKind::Audio, 0),
                (EntryKind::Audio, 1),
                (EntryKind::Subtitle, 1),
                (EntryKind::Subtitle, 3),
                (EntryKind::Audio, 5),
            ]
        );
    }
}
