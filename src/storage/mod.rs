//! Storage module for configuration.

pub mod config;

pub use config::{
    load_config, load_config_from, load_config_or_init, save_config_to, AnnouncementSettings,
    AppConfig, ConfigError, DemoSettings, DiscoverySettings, TrackingSettings,
};
