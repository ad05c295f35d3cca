//! Configuration management for daybook.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name under the platform config and data dirs.
const APP_DIR_NAME: &str = "daybook";

/// Default note directory, relative to the data directory.
const DEFAULT_POSTS_DIR: &str = "content/posts";

/// Default image directory, relative to the data directory.
const DEFAULT_IMAGES_DIR: &str = "static/images";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `DAYBOOK_`, sections split on `__`,
///    e.g. `DAYBOOK_STORAGE__DATA_DIR`)
/// 2. TOML config file at `~/.config/daybook/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where notes and images live.
    pub storage: StorageConfig,
    /// Front matter written into every note.
    pub notes: NotesConfig,
    /// Image upload policy.
    pub uploads: UploadConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory for all content.
    /// Defaults to `~/.local/share/daybook`
    pub data_dir: Option<PathBuf>,
    /// Directory holding `<date>.md` files. Relative paths resolve against `data_dir`.
    pub posts_dir: PathBuf,
    /// Directory holding `<date>/<filename>` images. Relative paths resolve against `data_dir`.
    pub images_dir: PathBuf,
}

/// Note metadata configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesConfig {
    /// Tags written into the front matter of every saved note.
    pub tags: Vec<String>,
}

/// Upload-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Lowercase filename extensions accepted for images.
    pub allowed_extensions: Vec<String>,
    /// Largest accepted image in bytes. Set to 0 for unlimited.
    pub max_image_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None, // Resolved at runtime
            posts_dir: PathBuf::from(DEFAULT_POSTS_DIR),
            images_dir: PathBuf::from(DEFAULT_IMAGES_DIR),
        }
    }
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            tags: vec!["Blog".to_string()],
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: default_allowed_extensions(),
            max_image_bytes: 10 * 1024 * 1024,
        }
    }
}

fn default_allowed_extensions() -> Vec<String> {
    ["png", "jpg", "jpeg", "gif"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// Later sources override earlier ones: defaults, then the TOML file (if
    /// it exists), then `DAYBOOK_`-prefixed environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("DAYBOOK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(APP_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.uploads.allowed_extensions.is_empty() {
            return Err(Error::ConfigValidation {
                message: "uploads.allowed_extensions must not be empty".to_string(),
            });
        }

        for ext in &self.uploads.allowed_extensions {
            if ext.is_empty() || ext.contains('.') || *ext != ext.to_lowercase() {
                return Err(Error::ConfigValidation {
                    message: format!(
                        "invalid extension '{ext}': use lowercase without a leading dot"
                    ),
                });
            }
        }

        if self.storage.posts_dir == self.storage.images_dir {
            return Err(Error::ConfigValidation {
                message: "storage.posts_dir and storage.images_dir must differ".to_string(),
            });
        }

        Ok(())
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Absolute location of the note directory.
    #[must_use]
    pub fn posts_dir(&self) -> PathBuf {
        self.resolve(&self.storage.posts_dir)
    }

    /// Absolute location of the image directory.
    #[must_use]
    pub fn images_dir(&self) -> PathBuf {
        self.resolve(&self.storage.images_dir)
    }

    /// Upload size limit, or `None` when unlimited.
    #[must_use]
    pub fn max_image_bytes(&self) -> Option<u64> {
        match self.uploads.max_image_bytes {
            0 => None,
            n => Some(n),
        }
    }

    fn resolve(&self, dir: &Path) -> PathBuf {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.data_dir().join(dir)
        }
    }
}
