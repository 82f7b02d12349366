//! Advanced SubStation Alpha (`.ass`) subtitle parsing
//!
//! An episode script is the dialogue text of every `Dialogue:` event, with
//! inline style overrides removed and `\N` line breaks turned into spaces.

use crate::error::{CharnetError, Result};
use crate::utils::{is_subtitle_file, parse_episode_number};
use regex::Regex;
use std::path::{Path, PathBuf};

/// Number of comma separated fields before the text of a `Dialogue:` event
const DIALOGUE_FIELDS_BEFORE_TEXT: usize = 9;

/// One parsed subtitle file
#[derive(Debug, Clone)]
pub struct SubtitleEpisode {
    pub path: PathBuf,
    pub episode: Option<u32>,
    pub script: String,
}

/// Subtitle parser
pub struct SubtitleParser {
    override_regex: Regex,
}

impl SubtitleParser {
    pub fn new() -> Result<Self> {
        let override_regex = Regex::new(r"\{[^}]*\}").map_err(|e| {
            CharnetError::Dataset(format!("Failed to compile override regex: {}", e))
        })?;
        Ok(Self { override_regex })
    }

    /// Extract the dialogue script from subtitle file contents
    pub fn parse_script(&self, content: &str) -> String {
        content
            .lines()
            .filter_map(|line| line.trim_start().strip_prefix("Dialogue:"))
            .filter_map(|event| {
                event
                    .splitn(DIALOGUE_FIELDS_BEFORE_TEXT + 1, ',')
                    .nth(DIALOGUE_FIELDS_BEFORE_TEXT)
            })
            .map(|text| {
                let text = self.override_regex.replace_all(text, "");
                text.replace("\\N", " ").replace("\\n", " ").trim().to_string()
            })
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parse a single subtitle file
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<SubtitleEpisode> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);
        let content = content.trim_start_matches('\u{feff}');

        Ok(SubtitleEpisode {
            path: path.to_path_buf(),
            episode: parse_episode_number(path),
            script: self.parse_script(content),
        })
    }

    /// Parse every `.ass` file in a directory, ordered by episode number then file name
    pub fn parse_directory<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<SubtitleEpisode>> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_subtitle_file(&path) {
                paths.push(path);
            }
        }

        let mut episodes = paths
            .iter()
            .map(|path| self.parse_file(path))
            .collect::<Result<Vec<_>>>()?;

        episodes.sort_by(|a, b| {
            a.episode
                .unwrap_or(u32::MAX)
                .cmp(&b.episode.unwrap_or(u32::MAX))
                .then_with(|| a.path.cmp(&b.path))
        });

        log::info!("Loaded {} subtitle files from {}", episodes.len(), dir.display());
        Ok(episodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = "[Script Info]\nTitle: Naruto\n\n[Events]\n\
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n\
Dialogue: 0,0:00:01.00,0:00:03.00,Default,,0,0,0,,{\\i1}Naruto, wait!{\\i0}\\NSasuke is here.\n\
Comment: 0,0:00:03.00,0:00:04.00,Default,,0,0,0,,ignored\n\
Dialogue: 0,0:00:04.00,0:00:06.00,Default,,0,0,0,,Sakura, look out.\n";

    #[test]
    fn test_parse_script() {
        let parser = SubtitleParser::new().unwrap();
        let script = parser.parse_script(SAMPLE);
        assert_eq!(script, "Naruto, wait! Sasuke is here. Sakura, look out.");
    }

    #[test]
    fn test_no_dialogue_is_empty_script() {
        let parser = SubtitleParser::new().unwrap();
        assert_eq!(parser.parse_script("[Script Info]\nTitle: x\n"), "");
    }

    #[test]
    fn test_parse_directory_orders_by_episode() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("Naruto - 10.ass"), SAMPLE).unwrap();
        std::fs::write(dir.path().join("Naruto - 2.ass"), SAMPLE).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not subtitles").unwrap();

        let parser = SubtitleParser::new().unwrap();
        let episodes = parser.parse_directory(dir.path()).unwrap();

        let numbers: Vec<Option<u32>> = episodes.iter().map(|e| e.episode).collect();
        assert_eq!(numbers, vec![Some(2), Some(10)]);
    }
}
