//! `ffprobe`/`ffmpeg` helpers for reading source media.

/// Audio PCM and streaming RGBA frame decoding.
pub mod decode;
/// Stream and duration probing.
pub mod probe;
