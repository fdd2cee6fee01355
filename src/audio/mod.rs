//! Narration and background audio mixing.

pub mod mix;
