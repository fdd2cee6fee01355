use std::path::{Path, PathBuf};

use rand::Rng;

use crate::audio::mix::{
    BackgroundKind, MIX_CHANNELS, MIX_SAMPLE_RATE, mix_narration, write_mix_to_f32le_file,
};
use crate::captions::render::{CaptionImage, CaptionRenderer};
use crate::captions::timing::CaptionUnit;
use crate::compose::overlay::overlay_centered;
use crate::compose::reframe::{CropRect, SliceWindow, pick_slice, reframe_crop};
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{AudioInputConfig, FrameRGBA, FrameSink, SinkConfig};
use crate::foundation::config::ComposeConfig;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{StoryError, StoryResult};
use crate::media::decode::{
    AudioPcm, FrameReaderOpts, TimeWindow, VideoFrameReader, decode_audio_f32_stereo,
};
use crate::media::probe::{probe_duration, probe_video};

/// Canvas height for a caption shown for its whole unit.
pub const CAPTION_BASE_HEIGHT_PX: u32 = 100;
/// Canvas height for one half of a split caption.
pub const SPLIT_CAPTION_BASE_HEIGHT_PX: u32 = 80;

/// Output rate and mix gains.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComposeSettings {
    pub fps: Fps,
    pub narration_gain: f32,
    pub music_gain: f32,
    pub ambient_gain: f32,
}

impl ComposeSettings {
    pub fn from_config(cfg: &ComposeConfig) -> StoryResult<Self> {
        Ok(Self {
            fps: Fps::new(cfg.fps, 1)?,
            narration_gain: cfg.narration_gain,
            music_gain: cfg.music_gain,
            ambient_gain: cfg.ambient_gain,
        })
    }
}

impl Default for ComposeSettings {
    fn default() -> Self {
        let cfg = ComposeConfig::default();
        Self {
            fps: Fps { num: cfg.fps, den: 1 },
            narration_gain: cfg.narration_gain,
            music_gain: cfg.music_gain,
            ambient_gain: cfg.ambient_gain,
        }
    }
}

/// Inputs of one composition.
#[derive(Clone, Copy, Debug)]
pub struct ComposeRequest<'a> {
    pub source_video: &'a Path,
    pub narration_audio: &'a Path,
    pub captions: &'a [CaptionUnit],
    /// Optional music bed, looped or trimmed to the narration.
    pub background_audio: Option<&'a Path>,
}

/// What a composition produced, independent of where frames went.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositionReport {
    pub width: u32,
    pub height: u32,
    pub frame_count: u64,
    pub duration_sec: f64,
    pub slice: SliceWindow,
    pub crop: CropRect,
    pub background: BackgroundKind,
    pub captions_rendered: usize,
    /// Frames that repeated the last decoded source frame.
    pub held_frames: u64,
}

/// A finished MP4 on disk.
#[derive(Clone, Debug, PartialEq)]
pub struct ComposedVideo {
    pub path: PathBuf,
    pub report: CompositionReport,
}

/// Slices, reframes, mixes, captions and encodes a narrated video.
pub struct VideoComposer {
    settings: ComposeSettings,
    renderer: Option<CaptionRenderer>,
}

impl VideoComposer {
    /// `renderer` of `None` produces a video without captions.
    pub fn new(settings: ComposeSettings, renderer: Option<CaptionRenderer>) -> Self {
        Self { settings, renderer }
    }

    pub fn settings(&self) -> &ComposeSettings {
        &self.settings
    }

    /// Compose into an MP4 at `out_path` and verify the file was written.
    #[tracing::instrument(skip_all, fields(out = %out_path.display()))]
    pub fn compose<R: Rng + ?Sized>(
        &mut self,
        req: &ComposeRequest<'_>,
        out_path: &Path,
        rng: &mut R,
    ) -> StoryResult<ComposedVideo> {
        let scratch = tempfile::Builder::new()
            .prefix("storyreel-mix")
            .tempdir()
            .map_err(|e| StoryError::composition(format!("failed to create scratch dir: {e}")))?;

        let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(out_path));
        let report = self.compose_into(req, &mut sink, scratch.path(), rng)?;

        let written = std::fs::metadata(out_path)
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false);
        if !written {
            return Err(StoryError::composition(format!(
                "encoder finished but '{}' was not created",
                out_path.display()
            )));
        }
        tracing::info!(
            frames = report.frame_count,
            duration_sec = report.duration_sec,
            "video written"
        );
        Ok(ComposedVideo {
            path: out_path.to_path_buf(),
            report,
        })
    }

    /// Compose into any sink. The audio mix is written under `scratch_dir`.
    pub fn compose_into<R: Rng + ?Sized>(
        &mut self,
        req: &ComposeRequest<'_>,
        sink: &mut dyn FrameSink,
        scratch_dir: &Path,
        rng: &mut R,
    ) -> StoryResult<CompositionReport> {
        self.compose_inner(req, sink, scratch_dir, rng)
            .map_err(StoryError::into_composition)
    }

    fn compose_inner<R: Rng + ?Sized>(
        &mut self,
        req: &ComposeRequest<'_>,
        sink: &mut dyn FrameSink,
        scratch_dir: &Path,
        rng: &mut R,
    ) -> StoryResult<CompositionReport> {
        let source = probe_video(req.source_video)?;
        let narration = decode_audio_f32_stereo(req.narration_audio, MIX_SAMPLE_RATE, None)?;
        if narration.is_empty() {
            return Err(StoryError::composition("narration decoded to no audio"));
        }
        let narration_sec = narration_length(req.narration_audio, &narration);
        let slice = pick_slice(source.duration_sec, narration_sec, rng)?;
        let crop = reframe_crop(source.width, source.height)?;
        tracing::info!(
            src_w = source.width,
            src_h = source.height,
            start_sec = slice.start_sec,
            duration_sec = slice.duration_sec,
            out_w = crop.width,
            out_h = crop.height,
            "slice and reframe chosen"
        );

        let (bed, background) = self.background_bed(req, source.has_audio, slice);
        let gain = match background {
            BackgroundKind::Music => self.settings.music_gain,
            BackgroundKind::Ambient => self.settings.ambient_gain,
            BackgroundKind::None => 0.0,
        };
        let mixed = mix_narration(
            &narration,
            self.settings.narration_gain,
            bed.as_ref().map(|b| (b, gain, background)),
        );
        let mix_path = scratch_dir.join("mix.f32le");
        write_mix_to_f32le_file(&mixed, &mix_path)?;

        let images = self.render_captions(req.captions, crop.width);
        let captions_rendered = images.iter().filter(|i| i.is_some()).count();

        let fps = self.settings.fps;
        let frame_count = fps.frames_to_cover(narration_sec);
        if frame_count == 0 {
            return Err(StoryError::composition("narration is shorter than one frame"));
        }

        sink.begin(SinkConfig {
            width: crop.width,
            height: crop.height,
            fps,
            audio: Some(AudioInputConfig {
                path: mix_path,
                sample_rate: MIX_SAMPLE_RATE,
                channels: MIX_CHANNELS,
            }),
        })?;

        let mut reader = VideoFrameReader::open(&FrameReaderOpts {
            source_path: req.source_video.to_path_buf(),
            window: TimeWindow {
                start_sec: slice.start_sec,
                duration_sec: slice.duration_sec,
            },
            crop: (crop.x, crop.y, crop.width, crop.height),
            fps,
        })?;

        let mut decoded = vec![0u8; reader.frame_len()];
        let mut has_frame = false;
        let mut held_frames = 0u64;
        for i in 0..frame_count {
            if reader.read_frame(&mut decoded)? {
                has_frame = true;
            } else if has_frame {
                held_frames += 1;
            } else {
                return Err(StoryError::composition(format!(
                    "no frames decoded from '{}'",
                    req.source_video.display()
                )));
            }

            let idx = FrameIndex(i);
            let mut frame = FrameRGBA::from_raw(crop.width, crop.height, decoded.clone())?;
            let t = fps.frame_time_secs(idx);
            for (unit, img) in req.captions.iter().zip(&images) {
                if let Some(img) = img
                    && unit.is_visible_at(t)
                {
                    overlay_centered(&mut frame, img);
                }
            }
            sink.push_frame(idx, &frame)?;
        }
        reader.finish()?;
        sink.end()?;

        if held_frames > 0 {
            tracing::warn!(held_frames, "source ran out of frames; held the last frame");
        }

        Ok(CompositionReport {
            width: crop.width,
            height: crop.height,
            frame_count,
            duration_sec: narration_sec,
            slice,
            crop,
            background,
            captions_rendered,
            held_frames,
        })
    }

    /// Music if present and decodable, else the slice's own audio, else nothing.
    fn background_bed(
        &self,
        req: &ComposeRequest<'_>,
        source_has_audio: bool,
        slice: SliceWindow,
    ) -> (Option<AudioPcm>, BackgroundKind) {
        if let Some(music) = req.background_audio {
            if !music.exists() {
                tracing::warn!(path = %music.display(), "background music missing");
            } else {
                match decode_audio_f32_stereo(music, MIX_SAMPLE_RATE, None) {
                    Ok(pcm) if !pcm.is_empty() => return (Some(pcm), BackgroundKind::Music),
                    Ok(_) => tracing::warn!(path = %music.display(), "background music is silent"),
                    Err(e) => {
                        tracing::warn!(path = %music.display(), error = %e, "background music unusable")
                    }
                }
            }
        }

        if source_has_audio {
            let window = TimeWindow {
                start_sec: slice.start_sec,
                duration_sec: slice.duration_sec,
            };
            match decode_audio_f32_stereo(req.source_video, MIX_SAMPLE_RATE, Some(window)) {
                Ok(pcm) if !pcm.is_empty() => return (Some(pcm), BackgroundKind::Ambient),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "source audio unusable"),
            }
        }
        tracing::info!("no background audio; narration only");
        (None, BackgroundKind::None)
    }

    fn render_captions(&mut self, captions: &[CaptionUnit], frame_w: u32) -> Vec<Option<CaptionImage>> {
        let Some(renderer) = self.renderer.as_mut() else {
            if !captions.is_empty() {
                tracing::warn!("no caption renderer; composing without captions");
            }
            return vec![None; captions.len()];
        };
        captions
            .iter()
            .enumerate()
            .map(|(i, unit)| {
                let base_height = if unit.split {
                    SPLIT_CAPTION_BASE_HEIGHT_PX
                } else {
                    CAPTION_BASE_HEIGHT_PX
                };
                let img = renderer.render(&unit.text, frame_w, base_height);
                match &img {
                    Some(img) => tracing::debug!(
                        index = i,
                        start = unit.start_seconds,
                        end = unit.end_seconds,
                        w = img.width,
                        h = img.height,
                        "caption rendered"
                    ),
                    None => tracing::warn!(index = i, text = %unit.text, "caption skipped"),
                }
                img
            })
            .collect()
    }
}

/// Narration length in seconds: the container duration, else the decoded sample count.
pub(crate) fn narration_length(path: &Path, pcm: &AudioPcm) -> f64 {
    match probe_duration(path) {
        Ok(secs) => secs,
        Err(e) => {
            let secs = pcm.duration_secs();
            tracing::warn!(path = %path.display(), error = %e, secs, "narration duration taken from decoded audio");
            secs
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/composer.rs"]
mod tests;
