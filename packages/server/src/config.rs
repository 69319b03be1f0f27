use std::time::Duration;

use common::StorageConfig;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::entity::{cache_node, version};

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// One operator-managed cache node, seeded into the catalog on startup.
#[derive(Debug, Deserialize, Clone)]
pub struct CacheNodeConfig {
    pub id: i32,
    pub name: String,
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub ftp_user: String,
    #[serde(default)]
    pub ftp_password: String,
    #[serde(default)]
    pub ftp_path: String,
    #[serde(default)]
    pub http_url: Option<String>,
    #[serde(default)]
    pub external_ip: Option<String>,
}

impl From<&CacheNodeConfig> for cache_node::Model {
    fn from(node: &CacheNodeConfig) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            host: node.host.clone(),
            port: node.port.map(i32::from),
            ftp_user: node.ftp_user.clone(),
            ftp_password: node.ftp_password.clone(),
            ftp_path: node.ftp_path.clone(),
            http_url: node.http_url.clone().filter(|url| !url.is_empty()),
            external_ip: node.external_ip.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// The origin node: uploads land here and unmapped clients are served here.
    pub default_cache_id: i32,
    #[serde(default)]
    pub nodes: Vec<CacheNodeConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DownloadConfig {
    /// Channel used when a download names neither version nor channel.
    /// Empty means "any channel".
    #[serde(default = "default_channel")]
    pub default_channel: String,
    /// Uploads with this filetype get a SHA-1 digest.
    #[serde(default = "default_digest_filetype")]
    pub digest_filetype: String,
}

fn default_channel() -> String {
    version::DEFAULT_CHANNEL.to_string()
}
fn default_digest_filetype() -> String {
    ".nupkg".to_string()
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            default_channel: default_channel(),
            digest_filetype: default_digest_filetype(),
        }
    }
}

impl DownloadConfig {
    pub fn default_channel(&self) -> Option<&str> {
        Some(self.default_channel.trim()).filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Ceiling for a whole upload request, replication included. Default: 600.
    #[serde(default = "default_upload_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_upload_timeout_secs() -> u64 {
    600
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_upload_timeout_secs(),
        }
    }
}

impl UploadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub cache: CacheConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("cache.default_cache_id", 1)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., RELEASE__DATABASE__URL)
            .add_source(Environment::with_prefix("RELEASE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
