//! Caption timing and caption rasterization.

/// Glyph rasterization of caption units into outlined RGBA images.
pub mod render;
/// Sentence segmentation and audio-driven caption timing.
pub mod timing;
