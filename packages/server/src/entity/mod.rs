pub mod asset;
pub mod cache_node;
pub mod client_affinity;
pub mod version;
