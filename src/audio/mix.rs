use std::path::Path;

use crate::foundation::error::{StoryError, StoryResult};
use crate::media::decode::AudioPcm;

/// Internal audio mixing sample rate used across decode/mix/encode.
pub const MIX_SAMPLE_RATE: u32 = 48_000;
/// Output channel count of the mix.
pub const MIX_CHANNELS: u16 = 2;

/// Which secondary bed ends up under the narration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackgroundKind {
    /// The configured background music track.
    Music,
    /// The source video slice's own audio.
    Ambient,
    /// Narration alone.
    None,
}

/// One input to [`mix_layers`].
#[derive(Clone, Debug)]
pub struct MixLayer<'a> {
    /// Interleaved samples with the same channel layout as the mix.
    pub samples: &'a [f32],
    pub gain: f32,
    /// Repeat from the start when the layer is shorter than the mix.
    pub looped: bool,
}

/// Sample frames covering `secs` at `sample_rate`, rounded to nearest.
pub fn frames_for_duration(secs: f64, sample_rate: u32) -> usize {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    (secs * f64::from(sample_rate)).round() as usize
}

/// Sum gained layers into `total_frames` interleaved frames, clamped to [-1, 1].
///
/// Non-looped layers are trimmed or end in silence; looped layers wrap.
pub fn mix_layers(total_frames: usize, channels: u16, layers: &[MixLayer<'_>]) -> Vec<f32> {
    let ch = usize::from(channels);
    let len = total_frames * ch;
    let mut out = vec![0.0f32; len];

    for layer in layers {
        let src = layer.samples;
        // Only whole frames take part.
        let src_len = src.len() - src.len() % ch.max(1);
        if src_len == 0 || layer.gain == 0.0 {
            continue;
        }
        for (i, dst) in out.iter_mut().enumerate() {
            let j = if layer.looped {
                i % src_len
            } else if i < src_len {
                i
            } else {
                break;
            };
            *dst += src[j] * layer.gain;
        }
    }

    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    out
}

/// Mix a narration with an optional background bed, sized to the narration.
pub fn mix_narration(
    narration: &AudioPcm,
    narration_gain: f32,
    background: Option<(&AudioPcm, f32, BackgroundKind)>,
) -> Vec<f32> {
    let total_frames = narration.frame_count();
    let mut layers = vec![MixLayer {
        samples: &narration.interleaved_f32,
        gain: narration_gain,
        looped: false,
    }];
    if let Some((bed, gain, kind)) = background
        && kind != BackgroundKind::None
    {
        layers.push(MixLayer {
            samples: &bed.interleaved_f32,
            gain,
            looped: kind == BackgroundKind::Music,
        });
    }
    mix_layers(total_frames, MIX_CHANNELS, &layers)
}

/// Write interleaved `f32` PCM samples to a raw little-endian `.f32le` file.
pub fn write_mix_to_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> StoryResult<()> {
    crate::encode::ffmpeg::ensure_parent_dir(out_path)?;

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        StoryError::Other(anyhow::anyhow!(
            "failed to write mixed audio file '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
