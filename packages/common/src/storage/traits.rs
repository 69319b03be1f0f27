use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// A file written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Path relative to the store root, `/`-separated, no leading slash.
    pub fd: String,
    /// Size in bytes.
    pub size: u64,
}

/// An opened stored file and its size on disk.
pub struct StoredReader {
    pub reader: BoxReader,
    pub size: u64,
}

impl fmt::Debug for StoredReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredReader").field("size", &self.size).finish_non_exhaustive()
    }
}

/// Path-addressed storage for the origin node's asset files.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store data from an async reader under a fresh name ending in `extension`.
    async fn put_stream(
        &self,
        extension: &str,
        reader: BoxReader,
    ) -> Result<StoredFile, StorageError>;

    /// Open a stored file for streaming.
    async fn get_stream(&self, fd: &str) -> Result<StoredReader, StorageError>;

    /// Absolute path of a stored file. Does not check existence.
    fn path_of(&self, fd: &str) -> Result<PathBuf, StorageError>;

    /// Delete a stored file.
    ///
    /// Returns `true` if the file was deleted, `false` if it did not exist.
    async fn delete(&self, fd: &str) -> Result<bool, StorageError>;
}
