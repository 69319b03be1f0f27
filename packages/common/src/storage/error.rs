use std::fmt;

/// Errors that can occur while storing or reading local asset files.
#[derive(Debug)]
pub enum StorageError {
    /// No file exists at the given relative path.
    NotFound(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// The relative path escapes the storage root or is malformed.
    InvalidPath(String),
    /// The upload exceeds the configured size limit.
    SizeLimitExceeded { actual: u64, limit: u64 },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(fd) => write!(f, "file not found: {fd}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::InvalidPath(fd) => write!(f, "invalid storage path: {fd}"),
            Self::SizeLimitExceeded { actual, limit } => {
                write!(f, "file exceeds size limit ({actual} > {limit} bytes)")
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
