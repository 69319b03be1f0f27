pub mod asset;
pub mod cache;
pub mod version;
