//! Client settings with persistence
//!
//! Settings are saved to `~/.config/depthify/settings.toml`

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use depthify_core::TimeConfig;
use depthify_integration::{ClientConfig, UserId};
use depthify_viewer::OrbitConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::phases::PHASE_DWELL;

/// All client settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub processing: ProcessingSettings,
    pub downloads: DownloadSettings,
    pub viewer: ViewerSettings,
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("depthify"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };

        let path = dir.join("settings.toml");

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(path)
    }

    /// Connection settings for the backend client
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url.clone(),
            timeout: self.api.request_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Frame pacing shared by the viewer loop and the job poll loop
    pub fn time_config(&self) -> TimeConfig {
        TimeConfig {
            frame_rate: self.viewer.frame_rate.max(1),
            ..Default::default()
        }
    }
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Backend origin
    pub base_url: String,
    /// Per-request timeout in seconds; unset waits indefinitely
    pub request_timeout_secs: Option<u64>,
    /// Owner sent with uploads when nobody is signed in
    pub user_id: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: depthify_integration::client::DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
            user_id: "1".to_string(),
        }
    }
}

impl ApiSettings {
    pub fn user_id(&self) -> UserId {
        UserId::new(self.user_id.clone())
    }
}

/// Processing display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingSettings {
    /// How long each processing phase label is shown, in milliseconds
    pub phase_dwell_ms: u64,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            phase_dwell_ms: PHASE_DWELL.as_millis() as u64,
        }
    }
}

impl ProcessingSettings {
    pub fn phase_dwell(&self) -> Duration {
        Duration::from_millis(self.phase_dwell_ms)
    }
}

/// Where downloaded models are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    pub directory: PathBuf,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            directory: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

/// Model viewer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Directory model paths are resolved against
    pub base_dir: PathBuf,
    /// Target frames per second
    pub frame_rate: u32,
    pub camera: OrbitConfig,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            frame_rate: 60,
            camera: OrbitConfig::default(),
        }
    }
}
