//! Panel settings management
//!
//! Stores request defaults in a plain JSON file.
//! A missing file means defaults.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{PanelError, Result};

const SETTINGS_FILE: &str = "settings.json";

/// Request and display defaults for a panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PanelSettings {
    /// Settings file version
    pub version: u32,
    /// Request timeout in seconds (0 = no timeout)
    pub request_timeout_secs: u64,
    /// User-Agent sent with every request
    pub user_agent: String,
    /// Server used when the operation declares none
    pub fallback_server_url: Option<String>,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            version: 1,
            request_timeout_secs: 0,
            user_agent: format!("tryit-panel/{}", env!("CARGO_PKG_VERSION")),
            fallback_server_url: None,
        }
    }
}

impl PanelSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective request timeout, if any
    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// Settings manager
pub struct SettingsManager {
    settings_file: PathBuf,
    settings: PanelSettings,
}

impl SettingsManager {
    /// Load settings from `storage_dir`, falling back to defaults
    pub fn new(storage_dir: &Path) -> Result<Self> {
        let settings_file = storage_dir.join(SETTINGS_FILE);
        let settings = Self::load_from_file(&settings_file)?;

        Ok(Self {
            settings_file,
            settings,
        })
    }

    /// Platform config directory for the panel
    pub fn default_dir() -> Result<PathBuf> {
        ProjectDirs::from("com", "symbia-labs", "tryit-panel")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| PanelError::StorageError("no home directory found".to_string()))
    }

    fn load_from_file(path: &Path) -> Result<PanelSettings> {
        if !path.exists() {
            debug!("No settings file found, using defaults");
            return Ok(PanelSettings::new());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: PanelSettings = serde_json::from_str(&contents)?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub async fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.settings)?;

        if let Some(parent) = self.settings_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write atomically using temp file
        let temp_path = self.settings_file.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.settings_file).await?;

        debug!("Saved settings to {:?}", self.settings_file);
        Ok(())
    }

    pub fn get(&self) -> &PanelSettings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut PanelSettings {
        &mut self.settings
    }

    /// Reset settings to defaults and delete settings file
    pub async fn reset(&mut self) -> Result<()> {
        self.settings = PanelSettings::default();

        if self.settings_file.exists() {
            tokio::fs::remove_file(&self.settings_file)
                .await
                .map_err(|e| PanelError::StorageError(e.to_string()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_default() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(temp_dir.path()).unwrap();

        let settings = manager.get();
        assert_eq!(settings.version, 1);
        assert_eq!(settings.request_timeout(), None);
        assert!(settings.user_agent.starts_with("tryit-panel/"));
        assert!(settings.fallback_server_url.is_none());
    }

    #[tokio::test]
    async fn test_settings_persistence() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut manager = SettingsManager::new(temp_dir.path()).unwrap();
            manager.get_mut().request_timeout_secs = 10;
            manager.get_mut().fallback_server_url = Some("http://localhost:8080".to_string());
            manager.save().await.unwrap();
        }

        {
            let manager = SettingsManager::new(temp_dir.path()).unwrap();
            assert_eq!(manager.get().request_timeout(), Some(Duration::from_secs(10)));
            assert_eq!(
                manager.get().fallback_server_url.as_deref(),
                Some("http://localhost:8080")
            );
        }
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(SETTINGS_FILE),
            r#"{"requestTimeoutSecs": 5}"#,
        )
        .unwrap();

        let manager = SettingsManager::new(temp_dir.path()).unwrap();
        assert_eq!(manager.get().request_timeout_secs, 5);
        assert_eq!(manager.get().version, 1);
    }

    #[tokio::test]
    async fn test_reset_removes_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = SettingsManager::new(temp_dir.path()).unwrap();
        manager.get_mut().request_timeout_secs = 3;
        manager.save().await.unwrap();
        assert!(temp_dir.path().join(SETTINGS_FILE).exists());

        manager.reset().await.unwrap();
        assert!(!temp_dir.path().join(SETTINGS_FILE).exists());
        assert_eq!(manager.get(), &PanelSettings::default());
    }
}
