//! Persisted run state: used and blacklisted story ids plus the last narration voice.
//!
//! Every operation reads the whole JSON record, mutates it in memory and rewrites it atomically.
//! Concurrent runs against the same files are not supported.

pub(crate) mod json_file;
/// Used/blacklisted id records.
pub mod store;
/// Last-voice slot and weighted voice choice.
pub mod voice;
