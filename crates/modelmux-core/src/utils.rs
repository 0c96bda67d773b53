//! Utility helpers — path resolution and model-name formatting.

use std::path::PathBuf;

/// Get the Modelmux data directory (e.g. `~/.modelmux/`).
pub fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".modelmux")
}

/// Turn a provider-qualified model id into a display name.
///
/// Separators become spaces, version tags keep their dots, and each word is
/// capitalized: `"anthropic.claude-v2:1"` → `"Anthropic Claude V2.1"`.
pub fn to_display_name(id: &str) -> String {
    let s = id
        .replace('-', " ")
        .replace('_', " ")
        .replace('.', " ")
        .replace(':', ".");
    s.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Truncate a string to at most `max_chars` characters. Unicode-safe.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Helper to get home directory.
fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}
