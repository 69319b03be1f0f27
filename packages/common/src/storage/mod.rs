mod error;
mod hash;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use hash::ContentDigest;
pub use traits::{BoxReader, FileStore, StoredFile, StoredReader};
