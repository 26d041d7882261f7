//! CLI commands
//!
//! This module organizes commands into logical submodules:
//! - `annotations`: list, add, edit, delete and outline
//! - `playback`: simulated playback through the session event loop
//!
//! Every command opens a headless [`PlayerSession`] on the video, waits for
//! its sidecar to load and flushes pending writes before returning.

pub mod annotations;
pub mod playback;

use crate::annotations::{normalize_level, Color, Level, Marker};
use crate::app::{PlayerSession, SessionEvent};
use crate::error::{AppError, Result};
use crate::playback::LogRenderTarget;
use crate::services::{PlayerSettings, SettingsService};
use crate::storage::FsPersistence;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

// Re-export all commands for convenient dispatch in main.rs
pub use annotations::*;
pub use playback::*;

/// Session type used by every CLI command
pub type CliSession = PlayerSession<LogRenderTarget, FsPersistence>;

/// Load settings from `settings_dir`, or use defaults without touching disk
pub async fn load_settings(settings_dir: Option<PathBuf>) -> Result<PlayerSettings> {
    match settings_dir {
        Some(dir) => SettingsService::new(dir).load().await,
        None => Ok(PlayerSettings::default()),
    }
}

/// Open `video` in a fresh session and wait for its annotations
pub async fn open_session(
    video: &Path,
    settings: &PlayerSettings,
) -> Result<(CliSession, mpsc::UnboundedReceiver<SessionEvent>)> {
    if !video.exists() {
        tracing::warn!("Video file {:?} does not exist; using its sidecar path anyway", video);
    }

    let (mut session, rx) =
        PlayerSession::new(LogRenderTarget::new(), Arc::new(FsPersistence), settings);

    if !session.open_video_and_load(video).await {
        return Err(AppError::Generic(format!(
            "Failed to load annotations for {}",
            video.display()
        )));
    }

    Ok((session, rx))
}

// ===== Argument parsers =====

/// Parse a color name
pub fn parse_color(raw: &str) -> std::result::Result<Color, String> {
    raw.parse::<Color>().map_err(|e| e.to_string())
}

/// Parse a level: 1 (high), 2 (medium) or 3 (low)
pub fn parse_level(raw: &str) -> std::result::Result<Level, String> {
    normalize_level(Some(raw)).ok_or_else(|| format!("Level must be 1, 2 or 3, got {:?}", raw))
}

/// Parse a marker rectangle given as `x,y,width,height` in percent
pub fn parse_marker(raw: &str) -> std::result::Result<Marker, String> {
    let parts = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<f64>, _>>()
        .map_err(|e| format!("Invalid marker {:?}: {}", raw, e))?;

    match parts[..] {
        [x, y, width, height] => Ok(Marker::new(x, y, width, height)),
        _ => Err(format!(
            "Marker must be x,y,width,height, got {} values",
            parts.len()
        )),
    }
}
