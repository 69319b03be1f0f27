use std::fs::File;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use suppaftp::types::FileType;
use suppaftp::{FtpResult, FtpStream};
use tracing::{debug, error};

use super::{RemoteTransfer, TransferError, TransferTarget, ancestor_dirs};

/// FTP client for pushing assets to cache nodes.
///
/// The FTP session runs on the blocking pool. A transfer that has started is
/// not interrupted if the awaiting future is dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct FtpTransferClient;

impl FtpTransferClient {
    pub fn new() -> Self {
        Self
    }
}

fn connect(target: &TransferTarget) -> Result<FtpStream, TransferError> {
    let mut ftp = FtpStream::connect((target.host.as_str(), target.port()))
        .map_err(|e| TransferError::new(target, e.to_string()))?;

    if let Err(e) = ftp.login(target.user.as_str(), target.password.as_str()) {
        let _ = ftp.quit();
        return Err(TransferError::new(target, e.to_string()));
    }
    Ok(ftp)
}

fn upload(ftp: &mut FtpStream, file: &mut File, remote_path: &str) -> FtpResult<()> {
    for dir in ancestor_dirs(remote_path) {
        // MKD fails when the directory already exists.
        let _ = ftp.mkdir(&dir);
    }
    ftp.transfer_type(FileType::Binary)?;
    ftp.put_file(remote_path, file)?;
    Ok(())
}

fn put_blocking(
    local: &Path,
    remote_path: &str,
    target: &TransferTarget,
) -> Result<(), TransferError> {
    let mut file = File::open(local).map_err(|e| {
        TransferError::new(target, format!("cannot read {}: {e}", local.display()))
    })?;

    let mut ftp = connect(target)?;
    let result = upload(&mut ftp, &mut file, remote_path)
        .map_err(|e| TransferError::new(target, e.to_string()));
    let _ = ftp.quit();
    result
}

fn delete_blocking(remote_path: &str, target: &TransferTarget) -> Result<(), TransferError> {
    let mut ftp = connect(target)?;
    let result = ftp
        .rm(remote_path)
        .map_err(|e| TransferError::new(target, e.to_string()));
    let _ = ftp.quit();
    result
}

#[async_trait]
impl RemoteTransfer for FtpTransferClient {
    async fn put(
        &self,
        local: &Path,
        remote_path: &str,
        target: &TransferTarget,
    ) -> Result<(), TransferError> {
        let local: PathBuf = local.to_path_buf();
        let remote = remote_path.to_string();
        let owned_target = target.clone();

        debug!(host = %target.address(), remote = %remote_path, "Uploading asset via FTP");
        let result =
            tokio::task::spawn_blocking(move || put_blocking(&local, &remote, &owned_target))
                .await
                .unwrap_or_else(|e| Err(TransferError::new(target, format!("task failed: {e}"))));

        if let Err(e) = &result {
            error!(host = %e.address, error = %e.message, "An error occurred while copying asset");
        }
        result
    }

    async fn delete(
        &self,
        remote_path: &str,
        target: &TransferTarget,
    ) -> Result<(), TransferError> {
        let remote = remote_path.to_string();
        let owned_target = target.clone();

        debug!(host = %target.address(), remote = %remote_path, "Deleting asset via FTP");
        let result = tokio::task::spawn_blocking(move || delete_blocking(&remote, &owned_target))
            .await
            .unwrap_or_else(|e| Err(TransferError::new(target, format!("task failed: {e}"))));

        if let Err(e) = &result {
            error!(host = %e.address, error = %e.message, "An error occurred while deleting asset");
        }
        result
    }
}
