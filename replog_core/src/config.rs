//! Configuration file support for RepLog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/replog/config.toml`, then
//! overridden by environment variables read once at process start.

use crate::store::StoreLocation;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub assets: AssetsConfig,
}

/// HTTP listener configuration
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Hand the request handler to an external host instead of listening
    #[serde(default)]
    pub serverless: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            serverless: false,
        }
    }
}

/// Entry store connection configuration
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

/// Static asset configuration
#[derive(Clone, Debug, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            static_dir: default_static_dir(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    3000
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|base| base.join("replog"))
        .unwrap_or_else(|| PathBuf::from(".replog"))
}

fn default_database_url() -> String {
    format!("file:{}", default_data_dir().join("entries.json").display())
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("replog")
            .join("config.toml")
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// Recognised keys: `PORT`, `DATABASE_URL`, `REPLOG_STATIC_DIR`,
    /// `REPLOG_SERVERLESS`, and `VERCEL` (any non-empty value enables
    /// serverless mode).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").filter(|v| !v.trim().is_empty()) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("PORT is not a valid port: {:?}", port)))?;
        }

        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            self.database.url = url;
        }

        if let Some(dir) = lookup("REPLOG_STATIC_DIR").filter(|v| !v.trim().is_empty()) {
            self.assets.static_dir = PathBuf::from(dir);
        }

        if let Some(flag) = lookup("REPLOG_SERVERLESS") {
            self.server.serverless = parse_flag(&flag);
        }

        if lookup("VERCEL").is_some_and(|v| !v.trim().is_empty()) {
            self.server.serverless = true;
        }

        Ok(())
    }

    /// Reject configurations the server cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::Config("server.host is empty".into()));
        }
        StoreLocation::parse(&self.database.url)?;
        Ok(())
    }

    /// `host:port` string for the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
