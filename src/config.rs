//! Configuration file support for boxtag.
//!
//! Settings are stored as pretty-printed JSON. Every file carries a format
//! version so older builds refuse files they cannot understand.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_PRECISION, DEFAULT_TAG, DEFAULT_TAGS, HANDLE_HIT_RADIUS, MAX_PRECISION, MIN_BOX_SIZE,
    MIN_PRECISION,
};
use crate::error::validate_tag;
use crate::session::SessionSettings;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get all log levels in order from least to most verbose.
    pub fn all() -> &'static [LogLevel] {
        &[
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ]
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }

    /// Shift verbosity by `steps` levels, saturating at either end.
    pub fn shifted(&self, steps: i32) -> LogLevel {
        let all = Self::all();
        let current = all.iter().position(|l| l == self).unwrap_or(2) as i32;
        let index = (current + steps).clamp(0, all.len() as i32 - 1);
        all[index as usize]
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Editor configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,

    /// Box editing behaviour
    #[serde(default)]
    pub editing: EditingConfig,

    /// Annotation file output
    #[serde(default)]
    pub format: FormatConfig,
}

/// User preferences section of the config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Editing section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditingConfig {
    /// Tag given to newly drawn boxes
    #[serde(default = "default_tag")]
    pub default_tag: String,

    /// Tags offered for quick selection
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,

    /// Handle grab radius in image pixels
    #[serde(default = "default_handle_radius")]
    pub handle_radius: f32,

    /// Minimum box width and height in image pixels
    #[serde(default = "default_min_box_size")]
    pub min_box_size: f32,

    /// Maximum undo depth, unbounded when absent
    #[serde(default)]
    pub max_history: Option<usize>,
}

fn default_tag() -> String {
    DEFAULT_TAG.to_string()
}

fn default_tags() -> Vec<String> {
    DEFAULT_TAGS.iter().map(|t| t.to_string()).collect()
}

fn default_handle_radius() -> f32 {
    HANDLE_HIT_RADIUS
}

fn default_min_box_size() -> f32 {
    MIN_BOX_SIZE
}

impl Default for EditingConfig {
    fn default() -> Self {
        Self {
            default_tag: default_tag(),
            tags: default_tags(),
            handle_radius: default_handle_radius(),
            min_box_size: default_min_box_size(),
            max_history: None,
        }
    }
}

/// Annotation format section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Decimal places per coordinate
    #[serde(default = "default_precision")]
    pub precision: usize,
}

fn default_precision() -> usize {
    DEFAULT_PRECISION
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
        }
    }
}

impl EditorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: UserPreferences::default(),
            editing: EditingConfig::default(),
            format: FormatConfig::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Check values the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let editing = &self.editing;
        for tag in std::iter::once(&editing.default_tag).chain(&editing.tags) {
            validate_tag(tag).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        if editing.handle_radius.is_nan() || editing.handle_radius <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "handle_radius must be positive, got {}",
                editing.handle_radius
            )));
        }
        if editing.min_box_size.is_nan() || editing.min_box_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "min_box_size must be positive, got {}",
                editing.min_box_size
            )));
        }
        if editing.max_history == Some(0) {
            return Err(ConfigError::Invalid(
                "max_history must be at least 1".to_string(),
            ));
        }
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&self.format.precision) {
            return Err(ConfigError::Invalid(format!(
                "precision must be between {} and {}, got {}",
                MIN_PRECISION, MAX_PRECISION, self.format.precision
            )));
        }
        Ok(())
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "boxtag-config.json"
    }

    /// Get the default config file path for auto-load/save.
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("boxtag").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("boxtag")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from a file.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Save configuration to the default path.
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save(&path)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&EditorConfig> for SessionSettings {
    fn from(config: &EditorConfig) -> Self {
        Self {
            default_tag: config.editing.default_tag.clone(),
            handle_radius: config.editing.handle_radius,
            min_box_size: config.editing.min_box_size,
            max_history: config.editing.max_history,
            precision: config.format.precision,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A value is outside what the editor accepts
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
