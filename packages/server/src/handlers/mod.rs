pub mod asset;
pub mod cache;
pub mod download;
pub mod version;
