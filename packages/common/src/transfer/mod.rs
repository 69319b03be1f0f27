//! Remote file transfer to cache nodes.
//!
//! Every call opens its own connection and closes it before returning;
//! connections are never pooled.

#[cfg(feature = "ftp")]
pub mod ftp;

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

#[cfg(feature = "ftp")]
pub use ftp::FtpTransferClient;

/// Standard FTP control port, used when a node has no port configured.
pub const DEFAULT_FTP_PORT: u16 = 21;

/// Connection details for one remote cache node.
#[derive(Clone)]
pub struct TransferTarget {
    pub host: String,
    pub port: Option<u16>,
    pub user: String,
    pub password: String,
}

impl TransferTarget {
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_FTP_PORT)
    }

    /// `host:port`, used in diagnostics.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port())
    }
}

impl fmt::Debug for TransferTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferTarget")
            .field("host", &self.host)
            .field("port", &self.port())
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// A failed remote transfer. Connection and operation failures share this type.
#[derive(Debug, Error)]
#[error("transfer to {address} failed: {message}")]
pub struct TransferError {
    pub address: String,
    pub message: String,
}

impl TransferError {
    pub fn new(target: &TransferTarget, message: impl Into<String>) -> Self {
        Self {
            address: target.address(),
            message: message.into(),
        }
    }
}

/// Moves files to and from a remote cache node.
#[async_trait]
pub trait RemoteTransfer: Send + Sync {
    /// Upload `local` to `remote_path`, creating missing parent directories.
    async fn put(
        &self,
        local: &Path,
        remote_path: &str,
        target: &TransferTarget,
    ) -> Result<(), TransferError>;

    /// Delete `remote_path` on the node.
    async fn delete(&self, remote_path: &str, target: &TransferTarget)
    -> Result<(), TransferError>;
}

/// Join a node's remote prefix with an artifact's relative path.
pub fn remote_join(prefix: &str, relative: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let relative = relative.trim_start_matches('/');
    if prefix.is_empty() {
        format!("/{relative}")
    } else {
        format!("{prefix}/{relative}")
    }
}

/// Every ancestor directory of `remote_path`, shallowest first.
///
/// `/srv/assets/v1/app.exe` yields `/srv`, `/srv/assets`, `/srv/assets/v1`.
pub fn ancestor_dirs(remote_path: &str) -> Vec<String> {
    let absolute = remote_path.starts_with('/');
    let segments: Vec<&str> = remote_path.split('/').filter(|s| !s.is_empty()).collect();
    let Some((_, dirs)) = segments.split_last() else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(dirs.len());
    let mut current = String::new();
    for dir in dirs {
        if absolute || !current.is_empty() {
            current.push('/');
        }
        current.push_str(dir);
        out.push(current.clone());
    }
    out
}
