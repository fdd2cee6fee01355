//! Output file naming.

use std::path::{Path, PathBuf};

/// Title prefixes removed before building a file name, applied in order.
pub const TITLE_PREFIXES: [&str; 8] = [
    "TrueOffMyChest: ",
    "Confession: ",
    "AITA for ",
    "AITA ",
    "WIBTA for ",
    "WIBTA ",
    "NoSleep: ",
    "Scary Story: ",
];

pub const MAX_FILENAME_CHARS: usize = 50;
pub const UNTITLED: &str = "untitled_story";

/// File-system safe stem derived from a story title.
pub fn safe_filename(title: &str) -> String {
    let mut clean = title.to_string();
    for prefix in TITLE_PREFIXES {
        clean = clean.replace(prefix, "");
    }

    let kept: String = clean
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();
    let mut safe = kept.split_whitespace().collect::<Vec<_>>().join("_");

    if safe.chars().count() > MAX_FILENAME_CHARS {
        safe = safe.chars().take(MAX_FILENAME_CHARS).collect();
        safe.truncate(safe.trim_end_matches('_').len());
    }

    if safe.is_empty() {
        UNTITLED.to_string()
    } else {
        safe
    }
}

/// `<root>/<group_slug>/<safe title>.mp4`.
pub fn output_path(root: &Path, group_slug: &str, title: &str) -> PathBuf {
    root.join(group_slug)
        .join(format!("{}.mp4", safe_filename(title)))
}

#[cfg(test)]
#[path = "../tests/unit/naming.rs"]
mod tests;
