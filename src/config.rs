//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::annotation::LabelStyle;
use crate::storage::StoreConfig;
use crate::time::TimeFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub annotations: AnnotationSettings,

    #[serde(default)]
    pub display: DisplaySettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Import and export settings
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    /// Reject captures with fewer sensor columns; unset accepts any
    #[serde(default)]
    pub required_sensors: Option<usize>,

    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

fn default_export_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("manometry").to_string_lossy().to_string())
        .unwrap_or_else(|| "./manometry_exports".to_string())
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            required_sensors: None,
            export_dir: default_export_dir(),
        }
    }
}

impl StoreSettings {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            required_sensors: self.required_sensors,
        }
    }
}

/// Marker label defaults
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationSettings {
    #[serde(default = "default_show_labels")]
    pub show_labels: bool,

    #[serde(default = "default_text_offset")]
    pub text_offset: f64,

    #[serde(default = "default_label_y_offset")]
    pub label_y_offset: f64,

    #[serde(default = "default_rotation")]
    pub rotation: f64,
}

fn default_show_labels() -> bool {
    true
}

fn default_text_offset() -> f64 {
    6.0
}

fn default_label_y_offset() -> f64 {
    0.75
}

fn default_rotation() -> f64 {
    90.0
}

impl Default for AnnotationSettings {
    fn default() -> Self {
        Self {
            show_labels: default_show_labels(),
            text_offset: default_text_offset(),
            label_y_offset: default_label_y_offset(),
            rotation: default_rotation(),
        }
    }
}

impl AnnotationSettings {
    pub fn style(&self) -> LabelStyle {
        LabelStyle {
            text_offset: self.text_offset,
            label_y_offset: self.label_y_offset,
            rotation: self.rotation,
        }
    }
}

/// Axis and view settings
#[derive(Debug, Clone, Deserialize)]
pub struct DisplaySettings {
    #[serde(default)]
    pub time_format: TimeFormat,

    #[serde(default = "default_tick_steps")]
    pub tick_steps: usize,

    #[serde(default = "default_value_margin")]
    pub value_margin: f64,

    #[serde(default = "default_x_scale")]
    pub x_scale: f64,
}

fn default_tick_steps() -> usize {
    7
}

fn default_value_margin() -> f64 {
    0.25
}

fn default_x_scale() -> f64 {
    100.0
}

impl DisplaySettings {
    /// Reject values the views cannot map time with
    pub fn validate(&self) -> Result<(), String> {
        if !(self.x_scale.is_finite() && self.x_scale > 0.0) {
            return Err(format!("display.x_scale must be positive, got {}", self.x_scale));
        }
        if !(self.value_margin.is_finite() && self.value_margin >= 0.0) {
            return Err(format!(
                "display.value_margin must not be negative, got {}",
                self.value_margin
            ));
        }
        Ok(())
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::default(),
            tick_steps: default_tick_steps(),
            value_margin: default_value_margin(),
            x_scale: default_x_scale(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Install the global subscriber
    ///
    /// `RUST_LOG` wins over the configured level. Returns false if a
    /// subscriber was already installed.
    pub fn init(&self) -> bool {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(format!("manometry={}", self.level))
        });

        let json = self.format.eq_ignore_ascii_case("json");
        let file = self.file.as_ref().and_then(|path| {
            match std::fs::OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => Some(file),
                Err(e) => {
                    eprintln!("Cannot open log file {}: {}", path, e);
                    None
                }
            }
        });

        let layer = match (json, file) {
            (true, Some(file)) => tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::sync::Mutex::new(file))
                .boxed(),
            (true, None) => tracing_subscriber::fmt::layer().json().boxed(),
            (false, Some(file)) => tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .boxed(),
            (false, None) => tracing_subscriber::fmt::layer().boxed(),
        };

        tracing_subscriber::registry()
            .with(layer)
            .with(filter)
            .try_init()
            .is_ok()
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        config.display.validate().map_err(|error| ConfigError::Invalid {
            path: path.to_path_buf(),
            error,
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("manometry").join("config.toml")),
            Some(PathBuf::from("./manometry.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Store overrides
        if let Some(required) = var("MANOMETRY_REQUIRED_SENSORS") {
            match required.parse::<usize>() {
                Ok(0) => self.store.required_sensors = None,
                Ok(n) => self.store.required_sensors = Some(n),
                Err(_) => tracing::warn!(value = %required, "Ignoring MANOMETRY_REQUIRED_SENSORS"),
            }
        }
        if let Some(dir) = var("MANOMETRY_EXPORT_DIR") {
            self.store.export_dir = dir;
        }

        // Display overrides
        if let Some(format) = var("MANOMETRY_TIME_FORMAT") {
            match format.parse() {
                Ok(f) => self.display.time_format = f,
                Err(e) => tracing::warn!(value = %format, error = %e, "Ignoring MANOMETRY_TIME_FORMAT"),
            }
        }

        // Annotation overrides
        if let Some(show) = var("MANOMETRY_SHOW_LABELS") {
            if let Ok(b) = show.parse() {
                self.annotations.show_labels = b;
            }
        }

        // Logging overrides
        if let Some(level) = var("MANOMETRY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("MANOMETRY_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid setting in {path:?}: {error}")]
    Invalid { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Manometry Configuration
#
# Environment variables override these settings:
# - MANOMETRY_REQUIRED_SENSORS (0 accepts any count)
# - MANOMETRY_EXPORT_DIR
# - MANOMETRY_TIME_FORMAT
# - MANOMETRY_SHOW_LABELS
# - MANOMETRY_LOG_LEVEL
# - MANOMETRY_LOG_FORMAT

[store]
# Reject captures declaring fewer sensor columns (36 for a full catheter)
# required_sensors = 36

# Where normalized exports are written when no output path is given
export_dir = "~/.local/share/manometry"

[annotations]
# Draw a text label next to each annotation marker
show_labels = true

# Horizontal label distance from the marker (display units)
text_offset = 6.0

# Label height: fraction of the value range on line charts,
# rows above the lowest on the spatio-temporal image
label_y_offset = 0.75

# Label rotation (degrees)
rotation = 90.0

[display]
# Time labels: "clock" (M:SS.S) or "seconds"
time_format = "clock"

# Time ticks are placed every len / tick_steps samples
tick_steps = 7

# Line chart value limits are widened by this fraction of the data range
value_margin = 0.25

# Line chart display units per second
x_scale = 100.0

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/manometry/manometry.log"
"#
    .to_string()
}
