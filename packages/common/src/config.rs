use std::path::PathBuf;

use serde::Deserialize;

/// Local storage configuration for the origin cache node.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory uploads are written to. Artifact `fd` values are relative to it.
    /// Default: "./data/assets".
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    /// Largest accepted upload in bytes. Default: 2 GiB.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("./data/assets")
}
fn default_max_upload_size() -> u64 {
    2 * 1024 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            max_upload_size: default_max_upload_size(),
        }
    }
}
