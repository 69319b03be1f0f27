use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sticky assignment of a client address to a cache node.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "client_affinity")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub client_key: String,
    pub cache_id: i32,
}

impl ActiveModelBehavior for ActiveModel {}
