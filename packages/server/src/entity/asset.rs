use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One physical copy of a release file on one cache node.
///
/// A single upload produces one row per node it reached; the rows share
/// `name`, `digest`, `filetype`, `fd` and `size` and differ in `cache_id`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "asset")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Original upload filename.
    pub name: String,

    /// Uppercase SHA-1 hex, empty when not computed.
    pub digest: String,

    /// Dot-prefixed extension, e.g. ".nupkg".
    pub filetype: String,

    /// Canonical platform id ("win32", "osx", "linux").
    pub platform: String,

    /// Path relative to the owning node's storage root.
    pub fd: String,

    pub size: i64,

    /// Owning cache node.
    pub cache_id: i32,

    pub download_count: i64,

    pub version_id: i32,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
