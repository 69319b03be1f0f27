pub mod config;
pub mod event;
pub mod storage;
pub mod transfer;

pub use config::StorageConfig;
