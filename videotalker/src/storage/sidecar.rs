//! Sidecar annotation file
//!
//! One JSON file per video, stored next to it. The video's extension is
//! replaced: "talk.mp4" is stored at "talk.videotalker.json".
//!
//! Reading never fails to the caller: a missing, unreadable or malformed
//! file yields `None` or an empty annotation list. Writing replaces the
//! whole file through a temp file and a rename.

use crate::annotations::Annotation;
use crate::config::{SIDECAR_EXTENSION, SIDECAR_VERSION};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Sidecar path for a video file
pub fn sidecar_path_for(video: &Path) -> PathBuf {
    video.with_extension(SIDECAR_EXTENSION)
}

/// On-disk sidecar document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidecarFile {
    pub video_file: String,
    pub created_at: DateTime<Utc>,
    pub version: String,
    pub annotations: Vec<Annotation>,
}

impl SidecarFile {
    /// Snapshot of a video's annotations, stamped with the current time
    pub fn new(video: &Path, annotations: Vec<Annotation>) -> Self {
        Self {
            video_file: video.to_string_lossy().to_string(),
            created_at: Utc::now(),
            version: SIDECAR_VERSION.to_string(),
            annotations,
        }
    }

    /// Decode a parsed JSON document leniently
    ///
    /// The annotation list is all-or-nothing: a non-array `annotations`
    /// field, or any entry that fails to decode, yields an empty list.
    pub fn from_value(mut value: Value) -> Self {
        let video_file = value
            .get("videoFile")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let version = value
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or(SIDECAR_VERSION)
            .to_string();

        let created_at = value
            .get("createdAt")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        let annotations = match value.get_mut("annotations").map(Value::take) {
            Some(list @ Value::Array(_)) => {
                serde_json::from_value(list).unwrap_or_else(|e| {
                    tracing::warn!("Discarding malformed annotation list: {}", e);
                    Vec::new()
                })
            }
            Some(_) => {
                tracing::warn!("Sidecar annotations field is not an array, treating as empty");
                Vec::new()
            }
            None => Vec::new(),
        };

        Self {
            video_file,
            created_at,
            version,
            annotations,
        }
    }
}

/// Storage backend for sidecar files
pub trait SidecarPersistence: Send + Sync + 'static {
    /// Read a sidecar; `None` on any failure
    fn read(&self, path: &Path) -> impl Future<Output = Option<SidecarFile>> + Send;

    /// Replace a sidecar with `file`
    fn write(&self, path: &Path, file: &SidecarFile) -> impl Future<Output = Result<()>> + Send;
}

/// File-system sidecar persistence
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPersistence;

impl SidecarPersistence for FsPersistence {
    async fn read(&self, path: &Path) -> Option<SidecarFile> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::info!("No readable sidecar at {:?}: {}", path, e);
                return None;
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(value) => Some(SidecarFile::from_value(value)),
            Err(e) => {
                tracing::info!("Sidecar {:?} is not valid JSON: {}", path, e);
                None
            }
        }
    }

    async fn write(&self, path: &Path, file: &SidecarFile) -> Result<()> {
        let content = serde_json::to_string_pretty(file)?;

        // Write to temp file first, then rename over the old sidecar
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content).await?;
        fs::rename(&temp_path, path).await?;

        Ok(())
    }
}
