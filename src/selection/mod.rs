//! Choosing the next story: quality filter, duration budget and quality-weighted draw.

/// Words-per-minute duration model and the hard narration ceiling.
pub mod duration;
/// Quality and continuation-post filtering.
pub mod filter;
/// Multi-strategy pool collection across a story group.
pub mod finder;
/// Candidate and package types.
pub mod model;
/// Fresh-pool computation and weighted draw.
pub mod selector;
