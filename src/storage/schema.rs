//! Cache table schema definitions

/// Cache schema version
pub const SCHEMA_VERSION: u32 = 1;

/// SQL for creating the episodes table; `position` keeps dataset order
pub const CREATE_EPISODES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS episodes (
    position INTEGER PRIMARY KEY,
    episode_id TEXT NOT NULL,
    script TEXT NOT NULL,
    ners TEXT NOT NULL
);
"#;

/// SQL for creating the metadata table
pub const CREATE_METADATA_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// SQL for reading every cached episode in dataset order
pub const SELECT_EPISODES: &str =
    "SELECT position, episode_id, script, ners FROM episodes ORDER BY position";
