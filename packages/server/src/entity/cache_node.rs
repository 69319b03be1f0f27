use common::transfer::TransferTarget;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A storage/serving target. Rows are managed by operators.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cache_node")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub name: String,
    pub host: String,
    /// FTP control port; `None` means 21.
    pub port: Option<i32>,
    pub ftp_user: String,
    pub ftp_password: String,
    /// Remote directory assets are uploaded under.
    pub ftp_path: String,
    /// Public base URL clients are redirected to.
    pub http_url: Option<String>,
    pub external_ip: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn transfer_target(&self) -> TransferTarget {
        TransferTarget {
            host: self.host.clone(),
            port: self.port.and_then(|p| u16::try_from(p).ok()),
            user: self.ftp_user.clone(),
            password: self.ftp_password.clone(),
        }
    }
}
