//! Video records as read from `videos.json`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};

/// A single video from the input list.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct VideoRecord {
    #[serde(alias = "video_id", alias = "videoId", deserialize_with = "lenient_id")]
    pub id: String,

    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,

    #[serde(alias = "desc", deserialize_with = "lenient_string")]
    pub description: Option<String>,

    #[serde(deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,

    #[serde(deserialize_with = "lenient_string")]
    pub category: Option<String>,

    #[serde(
        alias = "creation_date",
        alias = "upload_datetime",
        alias = "uploadDate",
        deserialize_with = "lenient_string"
    )]
    pub upload_date: Option<String>,

    #[serde(alias = "lastEditedDate", deserialize_with = "lenient_string")]
    pub last_edited_date: Option<String>,

    #[serde(alias = "viewCount", deserialize_with = "lenient_number")]
    pub view_count: Option<f64>,

    #[serde(alias = "likeCount", deserialize_with = "lenient_number")]
    pub like_count: Option<f64>,

    #[serde(alias = "commentCount", deserialize_with = "lenient_number")]
    pub comment_count: Option<f64>,

    #[serde(alias = "duration", deserialize_with = "lenient_number")]
    pub duration_seconds: Option<f64>,

    #[serde(alias = "channelTitle", deserialize_with = "lenient_string")]
    pub channel_title: Option<String>,

    /// Soft-deleted records are dropped on load
    #[serde(deserialize_with = "lenient_flag")]
    pub deleted: bool,
}

/// Accept string or numeric ids.
fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Accept strings and numbers; null and anything else read as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Accept booleans, `"true"`/`"1"`/`"yes"` and non-zero numbers. Null is false.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::String(s) => {
            matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
        }
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    })
}

/// Accept numbers, numeric strings and null; anything else reads as absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    })
}

/// Accept a list of strings or null; non-string entries are skipped.
fn lenient_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Errors that can occur when loading the video list.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Video data file not found: {0}")]
    Missing(String),

    #[error("Failed to read video data {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid video data in {path}: {message}")]
    InvalidJson { path: String, message: String },

    #[error("Video data in {0} is empty")]
    Empty(String),

    #[error("Video at index {0} has no id")]
    MissingId(usize),

    #[error("Every video is deleted or removed")]
    NothingToPublish,
}

/// Read the raw video list.
///
/// The file must exist and hold a non-empty JSON array. Records are not
/// checked any further; see [`select_videos`].
pub fn read_video_list(path: &Path) -> Result<Vec<VideoRecord>, LoadError> {
    let shown = path.display().to_string();

    if !path.exists() {
        return Err(LoadError::Missing(shown));
    }

    let content = fs::read_to_string(path).map_err(|e| LoadError::Read {
        path: shown.clone(),
        message: e.to_string(),
    })?;

    let records: Vec<VideoRecord> =
        serde_json::from_str(&content).map_err(|e| LoadError::InvalidJson {
            path: shown.clone(),
            message: e.to_string(),
        })?;

    if records.is_empty() {
        return Err(LoadError::Empty(shown));
    }

    tracing::debug!("Read {} video records from {}", records.len(), shown);
    Ok(records)
}

/// Keep the records that should be published.
///
/// Records marked `deleted` and records whose id is in `removed` are
/// dropped. Every other record needs an id, and at least one must remain.
pub fn select_videos(
    records: Vec<VideoRecord>,
    removed: &[String],
) -> Result<Vec<VideoRecord>, LoadError> {
    let missing = records
        .iter()
        .position(|r| !r.deleted && r.id.trim().is_empty());
    if let Some(index) = missing {
        return Err(LoadError::MissingId(index));
    }

    let total = records.len();
    let records: Vec<VideoRecord> = records
        .into_iter()
        .filter(|r| !r.deleted && !removed.iter().any(|id| id.trim() == r.id.trim()))
        .collect();

    if records.len() < total {
        tracing::info!("Skipped {} deleted or removed videos", total - records.len());
    }

    if records.is_empty() {
        return Err(LoadError::NothingToPublish);
    }

    Ok(records)
}

/// Read the video list and keep the publishable records.
pub fn load_videos(path: &Path, removed: &[String]) -> Result<Vec<VideoRecord>, LoadError> {
    let records = select_videos(read_video_list(path)?, removed)?;
    tracing::info!("Loaded {} videos from {}", records.len(), path.display());
    Ok(records)
}
