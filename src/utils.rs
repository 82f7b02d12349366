//! Utility functions for charnet
//!
//! This module provides common utility functions used throughout the project.

use crate::error::{CharnetError, Result};
use std::path::Path;

/// Get file extension from path
pub fn get_file_extension<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Check if a file is an Advanced SubStation Alpha subtitle file
pub fn is_subtitle_file<P: AsRef<Path>>(path: P) -> bool {
    matches!(get_file_extension(path).as_deref(), Some("ass"))
}

/// Episode number encoded in a subtitle file name.
///
/// Prefers the number after the last `-` of the stem (`Naruto Season 1 - 07.ass`),
/// falling back to the last run of digits anywhere in the stem.
pub fn parse_episode_number<P: AsRef<Path>>(path: P) -> Option<u32> {
    let stem = path.as_ref().file_stem()?.to_str()?;

    if let Some((_, tail)) = stem.rsplit_once('-') {
        if let Ok(number) = tail.trim().parse() {
            return Some(number);
        }
    }

    let digits: String = stem
        .chars()
        .rev()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    digits.parse().ok()
}

/// Create the parent directory of `path` if it doesn't exist
pub fn ensure_parent_directory<P: AsRef<Path>>(path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(CharnetError::Io)?;
        }
    }
    Ok(())
}

/// Calculate progress percentage
pub fn calculate_progress(current: usize, total: usize) -> f32 {
    if total == 0 {
        0.0
    } else {
        (current as f32 / total as f32) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_extension() {
        assert_eq!(get_file_extension("episode.ASS"), Some("ass".to_string()));
        assert_eq!(get_file_extension("episode"), None);
        assert_eq!(get_file_extension("data.tar.gz"), Some("gz".to_string()));
    }

    #[test]
    fn test_subtitle_detection() {
        assert!(is_subtitle_file("Naruto Season 1 - 01.ass"));
        assert!(!is_subtitle_file("scripts.jsonl"));
    }

    #[test]
    fn test_episode_number() {
        assert_eq!(parse_episode_number("subs/Naruto Season 1 - 07.ass"), Some(7));
        assert_eq!(parse_episode_number("ep12.ass"), Some(12));
        assert_eq!(parse_episode_number("s01e103_final.ass"), Some(103));
        assert_eq!(parse_episode_number("special.ass"), None);
    }

    #[test]
    fn test_progress_calculation() {
        assert_eq!(calculate_progress(0, 100), 0.0);
        assert_eq!(calculate_progress(50, 100), 50.0);
        assert_eq!(calculate_progress(0, 0), 0.0); // Edge case
    }

    #[test]
    fn test_ensure_parent_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("nested").join("deeper").join("ners.db");
        ensure_parent_directory(&file).unwrap();
        assert!(file.parent().unwrap().exists());

        // Bare file names have no parent to create
        ensure_parent_directory("ners.db").unwrap();
    }
}
