//! Linear audio reconstruction.

use cutreel_media::{Container, Entry};

/// Unsigned 8-bit mono samples with their playback rate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioTrack {
    /// Raw samples, one byte each.
    pub samples: Vec<u8>,
    /// Playback rate in Hz.
    pub sample_rate: f32,
}

impl AudioTrack {
    /// Playback length in seconds.
    pub fn duration(&self) -> f32 {
        if self.sample_rate > 0.0 {
            self.samples.len() as f32 / self.sample_rate
        } else {
            0.0
        }
    }
}

/// Concatenate the container's audio entries, in stream order, into one
/// contiguous track.
pub fn reconstruct_audio(container: &Container) -> AudioTrack {
    let mut samples = Vec::new();
    for entry in &container.entries {
        if let Entry::Audio { samples: data, .. } = entry {
            samples.extend_from_slice(data);
        }
    }
    AudioTrack {
        samples,
        sample_rate: f32::from(container.audio_sample_rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutreel_media::Timestamp;

    #[test]
    fn test_concatenates_in_stream_order() {
        let container = Container {
            audio_sample_rate: 22050,
            entries: vec![
                Entry::Audio {
                    at: Timestamp::ZERO,
                    samples: vec![1, 2],
                },
                Entry::Subtitle {
                    at: Timestamp::ZERO,
                    control: cutreel_media::SubtitleControl::ENGLISH,
                    text: b"x".to_vec(),
                },
                Entry::Audio {
                    at: Timestamp::new(1, 0),
                    samples: vec![3, 4, 5],
                },
            ],
            ..Container::default()
        };
        let track = reconstruct_audio(&container);
        assert_eq!(track.samples, vec![1, 2, 3, 4, 5]);
        assert_eq!(track.sample_rate, 22050.0);
    }

    #[test]
    fn test_empty_container_yields_empty_track() {
        let track = reconstruct_audio(&Container::default());
        assert!(track.samples.is_empty());
        assert_eq!(track.duration(), 0.0);
    }

    #[test]
    fn test_duration() {
        let track = AudioTrack {
            samples: vec![0; 22050],
            sample_rate: 22050.0,
        };
        assert_eq!(track.duration(), 1.0);
    }
}
