mod common;

mod download;
mod version;
