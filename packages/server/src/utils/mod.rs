pub mod filename;
pub mod platform;
pub mod version;
