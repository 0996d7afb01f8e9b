//! Application configuration.
//!
//! Loaded from `config.toml` in the platform data directory, or from the
//! file named by `POIVOICE_CONFIG`. Missing keys fall back to defaults. On
//! first run the defaults are written out so they can be edited.

use crate::announcements::DEFAULT_INTERVAL;
use crate::audio::AudioConfig;
use crate::discovery::{
    default_category_terms, DiscoveryConfig, DEFAULT_DUPLICATE_THRESHOLD_METERS,
    DEFAULT_MAX_RESULTS, DEFAULT_RADIUS_METERS,
};
use crate::geo::Position;
use crate::tracking::DEFAULT_MIN_MOVEMENT_METERS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the configuration file path.
pub const CONFIG_PATH_ENV: &str = "POIVOICE_CONFIG";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Discovery settings
    pub discovery: DiscoverySettings,
    /// Announcement settings
    pub announcements: AnnouncementSettings,
    /// Speech settings
    pub audio: AudioConfig,
    /// Live distance tracking settings
    pub tracking: TrackingSettings,
    /// Demo run settings for the binary
    pub demo: DemoSettings,
}

/// Discovery-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Acceptance radius in meters
    pub radius_meters: f64,
    /// Maximum POIs announced per cycle
    pub max_results: usize,
    /// Same-named places closer than this are merged
    pub duplicate_threshold_meters: f64,
    /// Search terms, one query each
    pub category_terms: Vec<String>,
    /// Per-term search timeout in seconds
    pub search_timeout_secs: u64,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            radius_meters: DEFAULT_RADIUS_METERS,
            max_results: DEFAULT_MAX_RESULTS,
            duplicate_threshold_meters: DEFAULT_DUPLICATE_THRESHOLD_METERS,
            category_terms: default_category_terms(),
            search_timeout_secs: 10,
        }
    }
}

impl DiscoverySettings {
    /// Engine configuration for these settings.
    pub fn to_discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            category_terms: self.category_terms.clone(),
            radius_meters: self.radius_meters.max(0.0),
            max_results: self.max_results,
            duplicate_threshold_meters: self.duplicate_threshold_meters.max(0.0),
            search_timeout: Duration::from_secs(self.search_timeout_secs.max(1)),
        }
    }
}

/// Announcement-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnouncementSettings {
    /// Seconds between announcement cycles
    pub interval_secs: u64,
    /// Narration locale
    pub locale: String,
    /// Optional `.ftl` file overriding narration phrases
    pub phrases_path: Option<PathBuf>,
}

impl Default for AnnouncementSettings {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL.as_secs(),
            locale: "fr-FR".to_string(),
            phrases_path: None,
        }
    }
}

impl AnnouncementSettings {
    /// Tick period, never shorter than one second.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

/// Tracking-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingSettings {
    /// Movement needed before a new distance is published, in meters
    pub min_movement_meters: f64,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            min_movement_meters: DEFAULT_MIN_MOVEMENT_METERS,
        }
    }
}

/// Settings for the demo binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    /// JSON place catalog; the bundled Paris catalog when absent
    pub places_path: Option<PathBuf>,
    /// GPX track to replay; a fixed position when absent
    pub track_path: Option<PathBuf>,
    /// Milliseconds between replayed track points
    pub replay_interval_ms: u64,
    /// Fixed starting latitude
    pub start_latitude: f64,
    /// Fixed starting longitude
    pub start_longitude: f64,
    /// Pin the closest POI for live distance tracking
    pub pin_nearest: bool,
    /// How long the demo runs, in seconds
    pub run_secs: u64,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            places_path: None,
            track_path: None,
            replay_interval_ms: 1000,
            start_latitude: 48.8566,
            start_longitude: 2.3522,
            pin_nearest: true,
            run_secs: 65,
        }
    }
}

impl DemoSettings {
    /// Fixed starting position.
    pub fn start_position(&self) -> Position {
        Position::new(self.start_latitude, self.start_longitude)
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "poivoice", "PoiVoice")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| get_data_dir().join("config.toml"))
}

/// Load application configuration from the default location.
///
/// Writes the defaults there when no file exists yet.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_or_init(&get_config_path())
}

/// Load configuration from `path`, creating it with the defaults if absent.
///
/// Failing to write the defaults is logged and does not fail the load.
pub fn load_config_or_init(path: &Path) -> Result<AppConfig, ConfigError> {
    if path.exists() {
        return load_config_from(path);
    }

    let config = AppConfig::default();
    match save_config_to(&config, path) {
        Ok(()) => tracing::info!("Wrote default config to {}", path.display()),
        Err(e) => tracing::warn!("Could not write default config to {}: {}", path.display(), e),
    }
    Ok(config)
}

/// Load application configuration from a file, defaulting when absent.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Save application configuration to a file.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
