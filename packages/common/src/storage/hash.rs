use std::fmt;
use std::path::Path;

use sha1::{Digest, Sha1};
use tokio::io::AsyncReadExt;

use super::error::StorageError;

/// A SHA-1 digest of an asset file, rendered as uppercase hex.
///
/// Installer update feeds (Squirrel `RELEASES` files) identify packages by this
/// digest, so the encoding must stay uppercase.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 20]);

impl ContentDigest {
    /// Compute the digest of an in-memory buffer.
    pub fn compute(data: &[u8]) -> Self {
        let hash = Sha1::digest(data);
        Self(hash.into())
    }

    /// Stream a file through the digest in one pass.
    pub async fn compute_file(path: &Path) -> Result<Self, StorageError> {
        let mut file = match tokio::fs::File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut hasher = Sha1::new();
        let mut buf = vec![0u8; 64 * 1024];
        loop {
            let n = file.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }

        Ok(Self(hasher.finalize().into()))
    }

    /// Return the digest as a 40-character uppercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.to_hex())
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
