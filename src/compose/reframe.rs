use rand::Rng;

use crate::foundation::error::{StoryError, StoryResult};

/// Output aspect ratio as `(width, height)`.
pub const TARGET_ASPECT: (u32, u32) = (9, 16);

/// Portion of the source video played under the narration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliceWindow {
    pub start_sec: f64,
    pub duration_sec: f64,
}

impl SliceWindow {
    pub fn end_sec(&self) -> f64 {
        self.start_sec + self.duration_sec
    }
}

/// Pick a random slice of `narration_sec` inside a source of `source_sec`.
///
/// The start is uniform in `[0, max(0, source - narration)]`. A source shorter than the narration
/// starts at 0 and the slice runs past its end.
pub fn pick_slice<R: Rng + ?Sized>(
    source_sec: f64,
    narration_sec: f64,
    rng: &mut R,
) -> StoryResult<SliceWindow> {
    if !narration_sec.is_finite() || narration_sec <= 0.0 {
        return Err(StoryError::composition(format!(
            "narration duration must be positive, got {narration_sec}"
        )));
    }
    if !source_sec.is_finite() || source_sec <= 0.0 {
        return Err(StoryError::composition(format!(
            "source duration must be positive, got {source_sec}"
        )));
    }
    let max_start = (source_sec - narration_sec).max(0.0);
    let start_sec = if max_start > 0.0 {
        rng.gen_range(0.0..=max_start)
    } else {
        0.0
    };
    Ok(SliceWindow {
        start_sec,
        duration_sec: narration_sec,
    })
}

/// Centered crop rectangle in source pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Centered 9:16 crop of a `width` x `height` source.
///
/// Wider sources lose width (`floor(h * 9 / 16)`), taller ones lose height (`floor(w * 16 / 9)`).
/// Only one dimension is ever cropped.
pub fn reframe_crop(width: u32, height: u32) -> StoryResult<CropRect> {
    if width == 0 || height == 0 {
        return Err(StoryError::composition("source video has zero size"));
    }
    let (aw, ah) = (u64::from(TARGET_ASPECT.0), u64::from(TARGET_ASPECT.1));
    let (w, h) = (u64::from(width), u64::from(height));

    // w/h > 9/16, compared without floats.
    let rect = if w * ah > h * aw {
        let cw = (h * aw / ah) as u32;
        CropRect {
            x: (width - cw) / 2,
            y: 0,
            width: cw,
            height,
        }
    } else {
        let ch = (w * ah / aw) as u32;
        CropRect {
            x: 0,
            y: (height - ch) / 2,
            width,
            height: ch,
        }
    };
    if rect.width == 0 || rect.height == 0 {
        return Err(StoryError::composition(format!(
            "source {width}x{height} is too small to reframe"
        )));
    }
    Ok(rect)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/reframe.rs"]
mod tests;
