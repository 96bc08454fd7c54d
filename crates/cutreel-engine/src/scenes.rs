//! Video scene reconstruction.
//!
//! One pass over the entry stream with a single mutable working frame
//! buffer. Palette and lookup-list entries bound scenes; high-res frames
//! are decoded into the working buffer and emitted as deep copies, so a
//! `Frame` never aliases the buffer the decoder keeps mutating. Decode
//! failures on individual entries are logged and skipped; cutscene data
//! is best-effort renderable even when partially corrupt.

use cutreel_media::compression::{rle, words, DecoderConfig, FrameTarget, TileDecoder};
use cutreel_media::{Bitmap, Container, Entry, Timestamp};
use tracing::warn;

/// One displayed video frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Deep copy of the working buffer and the palette active at capture.
    pub bitmap: Bitmap,
    /// When the frame starts displaying.
    pub display_time: Timestamp,
    /// How long the frame stays on screen, set from the next frame or
    /// the closing scene boundary.
    pub duration: Timestamp,
}

/// A run of frames between two palette or lookup-list boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scene {
    pub frames: Vec<Frame>,
}

/// Walk the entry stream and rebuild the movie's scenes.
pub fn reconstruct_scenes(container: &Container, decoder: &impl TileDecoder) -> Vec<Scene> {
    let width = usize::from(container.video_width);
    let height = usize::from(container.video_height);
    let mut pixels = vec![0u8; width * height];
    let mut palette = container.start_palette.clone();
    let mut config = DecoderConfig::default();

    let mut scenes = Vec::new();
    let mut open: Option<Scene> = None;

    for entry in &container.entries {
        match entry {
            Entry::Palette {
                at,
                palette: new_palette,
            } => {
                finish_scene(&mut scenes, &mut open, *at);
                palette = new_palette.clone();
            }
            Entry::PaletteReset { .. } => {
                palette = container.start_palette.clone();
            }
            Entry::ControlDictionary { at, data } => match words::unpack(data) {
                Ok(control_words) => config.set_control_words(control_words),
                Err(e) => warn!(error = %e, at = %at, "skipping malformed control dictionary"),
            },
            Entry::PaletteLookupList { at, data } => {
                finish_scene(&mut scenes, &mut open, *at);
                config.set_palette_lookup(data.clone());
            }
            Entry::LowResVideoFrame { at, data } => {
                if let Err(e) = rle::decompress(data, &mut pixels) {
                    warn!(error = %e, at = %at, "skipping malformed low-res frame");
                }
            }
            Entry::HighResVideoFrame {
                at,
                bitstream,
                maskstream,
            } => {
                let decoded = {
                    let mut target = FrameTarget {
                        width,
                        height,
                        pixels: &mut pixels,
                    };
                    decoder.decode_frame(&config, bitstream, maskstream, &mut target)
                };
                match decoded {
                    Ok(()) => {
                        let scene = open.get_or_insert_with(Scene::default);
                        if let Some(previous) = scene.frames.last_mut() {
                            previous.duration = at.delta_to(previous.display_time);
                        }
                        scene.frames.push(Frame {
                            bitmap: Bitmap {
                                width: container.video_width,
                                height: container.video_height,
                                pixels: pixels.clone(),
                                palette: palette.clone(),
                            },
                            display_time: *at,
                            duration: Timestamp::ZERO,
                        });
                    }
                    Err(e) => warn!(error = %e, at = %at, "skipping undecodable high-res frame"),
                }
            }
            Entry::Audio { .. } | Entry::Subtitle { .. } => {}
        }
    }
    finish_scene(&mut scenes, &mut open, container.end_timestamp);

    scenes
}

/// Close the open scene at a boundary, fixing up the last frame's
/// duration. A boundary at or before the frame's own timestamp clamps
/// the duration to zero rather than going negative.
fn finish_scene(scenes: &mut Vec<Scene>, open: &mut Option<Scene>, boundary: Timestamp) {
    if let Some(mut scene) = open.take() {
        if let Some(last) = scene.frames.last_mut() {
            last.duration = boundary.delta_to(last.display_time);
        }
        scenes.push(scene);
    }
}
