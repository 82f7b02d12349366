//! Input dataset loading
//!
//! A dataset is an ordered table of episodes. Supported sources are a directory
//! of `.ass` subtitle files (or a single one), a JSON array of objects, and JSON
//! Lines. Each row carries an episode id and its named columns.

pub mod subtitles;

pub use subtitles::{SubtitleEpisode, SubtitleParser};

use crate::error::{CharnetError, Result};
use crate::utils::{get_file_extension, is_subtitle_file};
use serde_json::{Map, Value};
use std::path::Path;

/// Columns that name an episode when present in a JSON row
const EPISODE_ID_COLUMNS: &[&str] = &["episode_id", "episode"];

/// One row of the input dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRow {
    pub episode_id: String,
    pub columns: Map<String, Value>,
}

impl DatasetRow {
    /// Build a row from a script, as subtitle loading does
    pub fn from_script(episode_id: impl Into<String>, script: impl Into<String>) -> Self {
        let episode_id = episode_id.into();
        let mut columns = Map::new();
        columns.insert("episode".to_string(), Value::String(episode_id.clone()));
        columns.insert("script".to_string(), Value::String(script.into()));
        Self {
            episode_id,
            columns,
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Text of a column; `null` reads as empty text, numbers and booleans as their literal
    pub fn text(&self, column: &str) -> Option<String> {
        match self.columns.get(column)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => Some(String::new()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }
}

/// Load the dataset at `path`, choosing the reader by path kind and extension
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Vec<DatasetRow>> {
    let path = path.as_ref();

    if path.is_dir() {
        let parser = SubtitleParser::new()?;
        return Ok(subtitle_rows(parser.parse_directory(path)?));
    }

    if !path.exists() {
        return Err(CharnetError::Dataset(format!(
            "Dataset not found: {}",
            path.display()
        )));
    }

    if is_subtitle_file(path) {
        let parser = SubtitleParser::new()?;
        return Ok(subtitle_rows(vec![parser.parse_file(path)?]));
    }

    let content = std::fs::read_to_string(path)?;
    let rows = match get_file_extension(path).as_deref() {
        Some("json") => parse_json_rows(&content)?,
        Some("jsonl") | Some("ndjson") => parse_json_lines(&content)?,
        other => {
            return Err(CharnetError::Dataset(format!(
                "Unsupported dataset format {:?} for {}",
                other.unwrap_or(""),
                path.display()
            )));
        }
    };

    log::info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn subtitle_rows(episodes: Vec<SubtitleEpisode>) -> Vec<DatasetRow> {
    episodes
        .into_iter()
        .map(|episode| {
            let id = match episode.episode {
                Some(number) => number.to_string(),
                None => episode
                    .path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default(),
            };
            DatasetRow::from_script(id, episode.script)
        })
        .collect()
}

/// Rows from a JSON array of objects
pub fn parse_json_rows(content: &str) -> Result<Vec<DatasetRow>> {
    let values: Vec<Value> = serde_json::from_str(content)?;
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| row_from_value(index, value))
        .collect()
}

/// Rows from JSON Lines, one object per non-blank line
pub fn parse_json_lines(content: &str) -> Result<Vec<DatasetRow>> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(index, line)| -> Result<DatasetRow> {
            row_from_value(index, serde_json::from_str(line)?)
        })
        .collect()
}

fn row_from_value(index: usize, value: Value) -> Result<DatasetRow> {
    let Value::Object(columns) = value else {
        return Err(CharnetError::Dataset(format!(
            "Row {} is not an object",
            index
        )));
    };

    let episode_id = EPISODE_ID_COLUMNS
        .iter()
        .find_map(|column| match columns.get(*column) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| index.to_string());

    Ok(DatasetRow {
        episode_id,
        columns,
    })
}
