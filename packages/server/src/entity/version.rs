use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The channel a version lands in when none is given.
pub const DEFAULT_CHANNEL: &str = "stable";

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "version")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Semantic version string, optionally `v`-prefixed.
    #[sea_orm(unique)]
    pub name: String,

    pub channel: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
