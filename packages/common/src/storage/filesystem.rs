use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};

use super::error::StorageError;
use super::traits::{BoxReader, FileStore, StoredFile, StoredReader};

/// Filesystem-backed store rooted at the origin node's asset directory.
///
/// Uploads land as `{base_path}/{uuid}{extension}`; partially written files
/// live under `{base_path}/.tmp` until they are complete.
pub struct LocalFileStore {
    base_path: PathBuf,
    max_size: u64,
}

impl LocalFileStore {
    /// Create a new store, creating the root directory if needed.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

/// Keep an extension only if it is a short dot-prefixed alphanumeric token.
fn sanitize_extension(extension: &str) -> &str {
    match extension.strip_prefix('.') {
        Some(rest)
            if !rest.is_empty()
                && rest.len() <= 16
                && rest.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            extension
        }
        _ => "",
    }
}

/// Reject relative paths that could escape the root.
fn validate_fd(fd: &str) -> Result<(), StorageError> {
    let invalid = fd.is_empty()
        || fd.starts_with('/')
        || fd.contains('\\')
        || fd.contains('\0')
        || fd
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if invalid {
        return Err(StorageError::InvalidPath(fd.to_string()));
    }
    Ok(())
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn put_stream(
        &self,
        extension: &str,
        mut reader: BoxReader,
    ) -> Result<StoredFile, StorageError> {
        let temp_path = self.temp_path();
        let mut total_bytes: u64 = 0;

        let mut buf = vec![0u8; 64 * 1024];
        let mut temp_file = fs::File::create(&temp_path).await?;

        loop {
            let n = match reader.read(&mut buf).await {
                Ok(n) => n,
                Err(e) => {
                    drop(temp_file);
                    let _ = fs::remove_file(&temp_path).await;
                    return Err(e.into());
                }
            };
            if n == 0 {
                break;
            }

            total_bytes += n as u64;
            if total_bytes > self.max_size {
                drop(temp_file);
                let _ = fs::remove_file(&temp_path).await;
                return Err(StorageError::SizeLimitExceeded {
                    actual: total_bytes,
                    limit: self.max_size,
                });
            }

            temp_file.write_all(&buf[..n]).await?;
        }

        temp_file.flush().await?;
        drop(temp_file);

        let fd = format!(
            "{}{}",
            uuid::Uuid::new_v4(),
            sanitize_extension(extension)
        );

        if let Err(e) = fs::rename(&temp_path, self.base_path.join(&fd)).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(StoredFile {
            fd,
            size: total_bytes,
        })
    }

    async fn get_stream(&self, fd: &str) -> Result<StoredReader, StorageError> {
        let path = self.path_of(fd)?;
        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(fd.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let size = file.metadata().await?.len();

        Ok(StoredReader {
            reader: Box::new(BufReader::new(file)),
            size,
        })
    }

    fn path_of(&self, fd: &str) -> Result<PathBuf, StorageError> {
        validate_fd(fd)?;
        Ok(self.base_path.join(fd))
    }

    async fn delete(&self, fd: &str) -> Result<bool, StorageError> {
        let path = self.path_of(fd)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
