//! Settings service
//!
//! Manages player settings persistence using JSON file storage.

use crate::annotations::Color;
use crate::config::{DEFAULT_TICK_SECS, FIND_TOLERANCE_SECS, SWEEP_THRESHOLD};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

/// Active-interval index tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSettings {
    /// Interval count at which queries switch from linear scan to sweep
    #[serde(default = "default_sweep_threshold")]
    pub sweep_threshold: usize,
}

fn default_sweep_threshold() -> usize {
    SWEEP_THRESHOLD
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            sweep_threshold: default_sweep_threshold(),
        }
    }
}

/// Annotation editing defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSettings {
    /// Window in seconds for matching an annotation to the playhead
    #[serde(default = "default_find_tolerance")]
    pub find_tolerance_secs: f64,
    /// Color for new annotations that do not pick one
    #[serde(default)]
    pub default_color: Color,
}

fn default_find_tolerance() -> f64 {
    FIND_TOLERANCE_SECS
}

impl Default for AnnotationSettings {
    fn default() -> Self {
        Self {
            find_tolerance_secs: default_find_tolerance(),
            default_color: Color::default(),
        }
    }
}

/// Simulated playback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSettings {
    /// Seconds between simulated time updates
    #[serde(default = "default_tick_secs")]
    pub tick_secs: f64,
}

fn default_tick_secs() -> f64 {
    DEFAULT_TICK_SECS
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
        }
    }
}

/// Player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlayerSettings {
    #[serde(default)]
    pub index: IndexSettings,
    #[serde(default)]
    pub annotations: AnnotationSettings,
    #[serde(default)]
    pub playback: PlaybackSettings,
}

/// Service for managing player settings
#[derive(Clone)]
pub struct SettingsService {
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new(settings_dir: PathBuf) -> Self {
        Self {
            settings_path: settings_dir.join("settings.json"),
        }
    }

    /// Load settings from disk or create default if not exists
    pub async fn load(&self) -> Result<PlayerSettings> {
        if !self.settings_path.exists() {
            tracing::info!("Settings file not found, creating default settings");
            let default = PlayerSettings::default();
            self.save(&default).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(&self.settings_path).await?;
        let settings: PlayerSettings = serde_json::from_str(&content)
            .map_err(|e| AppError::Settings(format!("Failed to parse settings: {}", e)))?;

        Ok(settings)
    }

    /// Save settings to disk
    pub async fn save(&self, settings: &PlayerSettings) -> Result<()> {
        if let Some(dir) = self.settings_path.parent() {
            fs::create_dir_all(dir).await?;
        }

        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.settings_path, content).await?;
        tracing::info!("Settings saved to {:?}", self.settings_path);

        Ok(())
    }

    /// Get index settings
    pub async fn get_index(&self) -> Result<IndexSettings> {
        let settings = self.load().await?;
        Ok(settings.index)
    }

    /// Update index settings
    pub async fn update_index(&self, index: IndexSettings) -> Result<()> {
        let mut settings = self.load().await?;
        settings.index = index;
        self.save(&settings).await?;
        Ok(())
    }

    /// Get annotation settings
    pub async fn get_annotations(&self) -> Result<AnnotationSettings> {
        let settings = self.load().await?;
        Ok(settings.annotations)
    }

    /// Update annotation settings
    pub async fn update_annotations(&self, annotations: AnnotationSettings) -> Result<()> {
        let mut settings = self.load().await?;
        settings.annotations = annotations;
        self.save(&settings).await?;
        Ok(())
    }

    /// Get playback settings
    pub async fn get_playback(&self) -> Result<PlaybackSettings> {
        let settings = self.load().await?;
        Ok(settings.playback)
    }

    /// Update playback settings
    pub async fn update_playback(&self, playback: PlaybackSettings) -> Result<()> {
        let mut settings = self.load().await?;
        settings.playback = playback;
        self.save(&settings).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_service() -> (SettingsService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let service = SettingsService::new(temp_dir.path().to_path_buf());
        (service, temp_dir)
    }

    #[tokio::test]
    async fn test_default_settings_created_on_load() {
        let (service, temp) = create_test_service();

        let settings = service.load().await.unwrap();

        assert_eq!(settings.index.sweep_threshold, 500);
        assert_eq!(settings.annotations.find_tolerance_secs, 0.5);
        assert_eq!(settings.annotations.default_color, Color::Blue);
        assert_eq!(settings.playback.tick_secs, 0.25);
        assert!(temp.path().join("settings.json").exists());
    }

    #[tokio::test]
    async fn test_annotation_settings_get_and_update() {
        let (service, _temp) = create_test_service();

        let updated = AnnotationSettings {
            find_tolerance_secs: 1.5,
            default_color: Color::Green,
        };
        service.update_annotations(updated.clone()).await.unwrap();

        let loaded = service.get_annotations().await.unwrap();
        assert_eq!(loaded, updated);
    }

    #[tokio::test]
    async fn test_settings_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let settings_dir = temp_dir.path().to_path_buf();

        // Create service, update settings, drop it
        {
            let service = SettingsService::new(settings_dir.clone());
            service
                .update_index(IndexSettings { sweep_threshold: 50 })
                .await
                .unwrap();
            service
                .update_playback(PlaybackSettings { tick_secs: 1.0 })
                .await
                .unwrap();
        }

        // Create new service, verify settings were persisted
        {
            let service = SettingsService::new(settings_dir);
            assert_eq!(service.get_index().await.unwrap().sweep_threshold, 50);
            assert_eq!(service.get_playback().await.unwrap().tick_secs, 1.0);
        }
    }

    #[tokio::test]
    async fn test_partial_settings_file_uses_defaults() {
        let (service, temp) = create_test_service();
        std::fs::write(
            temp.path().join("settings.json"),
            r#"{ "annotations": { "default_color": "purple" } }"#,
        )
        .unwrap();

        let settings = service.load().await.unwrap();

        assert_eq!(settings.annotations.default_color, Color::Purple);
        assert_eq!(settings.annotations.find_tolerance_secs, 0.5);
        assert_eq!(settings.index, IndexSettings::default());
    }

    #[tokio::test]
    async fn test_corrupt_settings_file_is_an_error() {
        let (service, temp) = create_test_service();
        std::fs::write(temp.path().join("settings.json"), "{ not json").unwrap();

        let result = service.load().await;
        assert!(matches!(result, Err(AppError::Settings(_))));
    }
}
