//! Per-language subtitle reconstruction.

use cutreel_common::{Codepage, Language};
use cutreel_media::{Container, Entry, SubtitleControl, Timestamp};

/// One timestamped subtitle line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleCue {
    /// When the line starts displaying.
    pub at: Timestamp,
    /// Decoded text; empty text clears the display.
    pub text: String,
}

/// Ordered subtitle cues for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subtitles {
    pub cues: Vec<SubtitleCue>,
}

impl Subtitles {
    /// Append one cue.
    pub fn add(&mut self, at: Timestamp, text: impl Into<String>) {
        self.cues.push(SubtitleCue {
            at,
            text: text.into(),
        });
    }

    /// Whether there are no cues.
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}

/// Collect the cues of one language from the container's entry stream.
///
/// When the list ends with a non-empty line, a synthetic empty cue at
/// the container's end timestamp closes it, so renderers can derive
/// every cue's duration from its successor.
pub fn reconstruct_subtitles(
    container: &Container,
    codepage: Codepage,
    language: Language,
) -> Subtitles {
    let expected = SubtitleControl::for_language(language);
    let mut subtitles = Subtitles::default();
    for entry in &container.entries {
        if let Entry::Subtitle { at, control, text } = entry {
            if *control == expected {
                subtitles.add(*at, codepage.decode(text));
            }
        }
    }
    if subtitles.cues.last().is_some_and(|cue| !cue.text.is_empty()) {
        subtitles.add(container.end_timestamp, "");
    }
    subtitles
}
