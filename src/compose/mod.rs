//! Video composition: slice, reframe, audio mix, caption overlay, encode.

pub mod composer;
pub mod overlay;
pub mod reframe;
