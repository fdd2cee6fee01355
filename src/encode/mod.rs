//! Frame sinks: the `ffmpeg` MP4 encoder and an in-memory sink for tests.

/// `ffmpeg` child-process MP4 sink and process helpers.
pub mod ffmpeg;
/// Sink contract and shared frame types.
pub mod sink;
