// SPDX-License-Identifier: AGPL-3.0
// Campus Exchange Core - Settings persistence
//
// Settings are stored in a local JSON file in the platform config directory.
// The exchange data itself lives in `data_dir`, the working directory by default.

use crate::storage::{self, JsonFile};
use crate::types::AppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

/// Default similarity score a search hit must reach
pub const DEFAULT_SEARCH_THRESHOLD: u8 = 50;

/// Value given to properties added to a schema after items were created
pub const DEFAULT_PLACEHOLDER: &str = "unknown";

/// Application settings (frontend-agnostic)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeSettings {
    /// Directory holding users.json, item_types.json and items.json
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Minimum fuzzy score (0-100) for a search hit
    #[serde(default = "default_search_threshold")]
    pub search_threshold: u8,
    /// Placeholder for properties missing after a schema change
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_search_threshold() -> u8 {
    DEFAULT_SEARCH_THRESHOLD
}

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            search_threshold: default_search_threshold(),
            placeholder: default_placeholder(),
        }
    }
}

impl ExchangeSettings {
    /// Settings rooted at a specific data directory
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join("users.json")
    }

    pub fn item_types_path(&self) -> PathBuf {
        self.data_dir.join("item_types.json")
    }

    pub fn items_path(&self) -> PathBuf {
        self.data_dir.join("items.json")
    }
}

/// In-memory cache of settings, persisted to disk on changes
pub struct SettingsStore {
    settings: RwLock<ExchangeSettings>,
    file: JsonFile,
}

impl SettingsStore {
    /// Open the settings file in the platform config directory
    pub fn new() -> Result<Self, AppError> {
        Self::open(Self::get_settings_path()?)
    }

    /// Open a settings file at an explicit path, creating it with defaults if needed
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let file = JsonFile::new(path);
        tracing::info!("Settings file path: {:?}", file.path());

        let (settings, exists) = match file.load::<ExchangeSettings>() {
            Ok(Some(settings)) => (settings, true),
            Ok(None) => {
                tracing::info!("No settings file found, using defaults");
                (ExchangeSettings::default(), false)
            }
            Err(AppError::Serialization(e)) => {
                tracing::warn!("Failed to parse settings, using defaults: {}", e);
                (ExchangeSettings::default(), true)
            }
            Err(e) => return Err(e),
        };

        let store = Self {
            settings: RwLock::new(settings),
            file,
        };

        if !exists {
            tracing::info!("Creating initial settings file");
            store.persist()?;
        }

        Ok(store)
    }

    /// Get the path to the settings file
    fn get_settings_path() -> Result<PathBuf, AppError> {
        let config_dir = directories::ProjectDirs::from("org", "campus", "exchange")
            .ok_or_else(|| AppError::FileIo("Could not determine config directory".to_string()))?
            .config_dir()
            .to_path_buf();

        fs::create_dir_all(&config_dir)
            .map_err(|e| AppError::FileIo(format!("Failed to create config dir: {}", e)))?;

        Ok(config_dir.join("settings.json"))
    }

    fn persist(&self) -> Result<(), AppError> {
        self.file.save(&*storage::read(&self.settings))
    }

    /// Get current settings
    pub fn get(&self) -> ExchangeSettings {
        storage::read(&self.settings).clone()
    }
}
