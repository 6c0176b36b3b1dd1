use std::path::PathBuf;
use serde::{Deserialize, Serialize};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATABASE_URL: &str = "sqlite://database.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_MAX_BODY_SIZE: usize = 2 * 1024 * 1024;
const DEFAULT_YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub port: Option<u16>,
    pub static_dir: Option<String>,
    pub log_level: Option<String>,
    pub max_body_size: Option<usize>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct YoutubeSection {
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub youtube: YoutubeSection,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone, Debug)]
pub struct YoutubeConfig {
    pub api_key: Option<String>,
    pub api_base_url: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub static_dir: PathBuf,
    pub log_level: String,
    pub max_body_size: usize,
    pub database: DatabaseConfig,
    pub youtube: YoutubeConfig,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let base_dir = std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."));

        // Try to load config file
        let config_path = base_dir.join("config.toml");
        let config_file = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Some(toml::from_str::<ConfigFile>(&content)?)
        } else {
            None
        };

        Ok(Self::from_sources(
            &base_dir,
            config_file.unwrap_or_default(),
            |key| std::env::var(key).ok(),
        ))
    }

    /// Merges the config file with environment overrides; env vars win.
    pub fn from_sources<F>(base_dir: &std::path::Path, file: ConfigFile, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = env("PORT")
            .and_then(|p| p.parse().ok())
            .or(file.server.port)
            .unwrap_or(DEFAULT_PORT);

        let static_dir_str = env("STATIC_DIR")
            .or(file.server.static_dir)
            .unwrap_or_else(|| "static".to_string());

        let static_dir = if static_dir_str.starts_with('/') {
            PathBuf::from(static_dir_str)
        } else {
            base_dir.join(static_dir_str)
        };

        let log_level = env("LOG_LEVEL")
            .or(file.server.log_level)
            .unwrap_or_else(|| "info".to_string());

        let max_body_size = env("MAX_BODY_SIZE")
            .and_then(|v| v.parse().ok())
            .or(file.server.max_body_size)
            .filter(|&v| v > 0)
            .unwrap_or(DEFAULT_MAX_BODY_SIZE);

        let database = DatabaseConfig {
            url: env("DATABASE_URL")
                .or(file.database.url)
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            max_connections: env("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .or(file.database.max_connections)
                .filter(|&v| v > 0)
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        };

        // An empty key counts as no key at all
        let youtube = YoutubeConfig {
            api_key: env("YOUTUBE_API_KEY")
                .or(file.youtube.api_key)
                .filter(|k| !k.trim().is_empty()),
            api_base_url: env("YOUTUBE_API_BASE_URL")
                .or(file.youtube.api_base_url)
                .unwrap_or_else(|| DEFAULT_YOUTUBE_API_BASE.to_string()),
        };

        Self {
            port,
            static_dir,
            log_level,
            max_body_size,
            database,
            youtube,
        }
    }

    /// Default tracing directive, used when `RUST_LOG` is unset.
    pub fn log_directive(&self) -> String {
        format!(
            "video_registry={},tower_http={}",
            self.log_level, self.log_level
        )
    }

    pub fn from_env() -> Self {
        Self::load().unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        let base_dir = std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."));

        Self::from_sources(&base_dir, ConfigFile::default(), |_| None)
    }
}
