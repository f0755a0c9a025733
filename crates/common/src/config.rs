//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Engagement behaviour configuration.
    #[serde(default)]
    pub engagement: EngagementConfig,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Settings used when materializing engagement data for display.
#[derive(Debug, Clone, Deserialize)]
pub struct EngagementConfig {
    /// Display name shown for comments whose author cannot be resolved.
    #[serde(default = "default_unknown_author_label")]
    pub unknown_author_label: String,
    /// Avatar reference used when a profile has none.
    #[serde(default = "default_avatar")]
    pub default_avatar: String,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            unknown_author_label: default_unknown_author_label(),
            default_avatar: default_avatar(),
        }
    }
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_unknown_author_label() -> String {
    "Unknown User".to_string()
}

fn default_avatar() -> String {
    "/avatars/default.png".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `INKFEED_ENV`)
    /// 3. Environment variables with `INKFEED_` prefix (a `.env` file is read first)
    pub fn load() -> Result<Self, config::ConfigError> {
        // A missing .env file is fine.
        dotenvy::dotenv().ok();

        let env = std::env::var("INKFEED_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("INKFEED")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("INKFEED")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
