use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, ExprTrait, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Select, Set, SqlErr,
};
use uuid::Uuid;

use super::{ArtifactFilter, Catalog, CatalogError, NewArtifact, NewVersion};
use crate::entity::{asset, cache_node, client_affinity, version};

/// `Catalog` backed by the relational database.
#[derive(Clone)]
pub struct DbCatalog {
    db: DatabaseConnection,
}

impl DbCatalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn apply_filter(
    mut select: Select<asset::Entity>,
    filter: &ArtifactFilter,
) -> Select<asset::Entity> {
    if !filter.platforms.is_empty() {
        select = select.filter(asset::Column::Platform.is_in(filter.platforms.clone()));
    }
    if let Some(filetype) = &filter.filetype {
        select = select.filter(asset::Column::Filetype.eq(filetype.as_str()));
    }
    if let Some(cache_id) = filter.cache_id {
        select = select.filter(asset::Column::CacheId.eq(cache_id));
    }
    select
}

#[async_trait]
impl Catalog for DbCatalog {
    async fn cache_for_client(&self, client_key: &str) -> Result<Option<i32>, CatalogError> {
        Ok(client_affinity::Entity::find_by_id(client_key.to_string())
            .one(&self.db)
            .await?
            .map(|affinity| affinity.cache_id))
    }

    async fn latest_version(
        &self,
        name: Option<&str>,
        channel: Option<&str>,
    ) -> Result<Option<version::Model>, CatalogError> {
        let mut select = version::Entity::find();
        if let Some(name) = name {
            select = select.filter(version::Column::Name.eq(name));
        }
        if let Some(channel) = channel {
            select = select.filter(version::Column::Channel.eq(channel));
        }

        Ok(select
            .order_by_desc(version::Column::CreatedAt)
            .one(&self.db)
            .await?)
    }

    async fn find_version_by_name(
        &self,
        name: &str,
    ) -> Result<Option<version::Model>, CatalogError> {
        Ok(version::Entity::find()
            .filter(version::Column::Name.eq(name))
            .one(&self.db)
            .await?)
    }

    async fn create_version(&self, new: NewVersion) -> Result<version::Model, CatalogError> {
        let model = version::ActiveModel {
            name: Set(new.name.clone()),
            channel: Set(new.channel),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(created) => Ok(created),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(CatalogError::Conflict(
                    format!("Version '{}' already exists", new.name),
                )),
                _ => Err(e.into()),
            },
        }
    }

    async fn list_versions(
        &self,
        channel: Option<&str>,
    ) -> Result<Vec<version::Model>, CatalogError> {
        let mut select = version::Entity::find();
        if let Some(channel) = channel {
            select = select.filter(version::Column::Channel.eq(channel));
        }
        Ok(select
            .order_by_desc(version::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn version_artifacts(
        &self,
        version_id: i32,
        filter: &ArtifactFilter,
    ) -> Result<Vec<asset::Model>, CatalogError> {
        let select = asset::Entity::find().filter(asset::Column::VersionId.eq(version_id));
        Ok(apply_filter(select, filter)
            .order_by_desc(asset::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn latest_artifact(
        &self,
        filter: &ArtifactFilter,
    ) -> Result<Option<asset::Model>, CatalogError> {
        Ok(apply_filter(asset::Entity::find(), filter)
            .order_by_desc(asset::Column::CreatedAt)
            .one(&self.db)
            .await?)
    }

    async fn find_artifact(&self, id: Uuid) -> Result<Option<asset::Model>, CatalogError> {
        Ok(asset::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn create_artifact(
        &self,
        new: NewArtifact,
        cache_id: i32,
    ) -> Result<asset::Model, CatalogError> {
        let model = asset::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(new.name),
            digest: Set(new.digest),
            filetype: Set(new.filetype),
            platform: Set(new.platform),
            fd: Set(new.fd),
            size: Set(new.size),
            cache_id: Set(cache_id),
            download_count: Set(0),
            version_id: Set(new.version_id),
            created_at: Set(Utc::now()),
        };
        Ok(model.insert(&self.db).await?)
    }

    async fn delete_artifact(&self, id: Uuid) -> Result<bool, CatalogError> {
        let result = asset::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn increment_download_count(&self, id: Uuid) -> Result<(), CatalogError> {
        asset::Entity::update_many()
            .col_expr(
                asset::Column::DownloadCount,
                Expr::col(asset::Column::DownloadCount).add(1),
            )
            .filter(asset::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn find_cache_node(&self, id: i32) -> Result<Option<cache_node::Model>, CatalogError> {
        Ok(cache_node::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn list_cache_nodes(&self) -> Result<Vec<cache_node::Model>, CatalogError> {
        Ok(cache_node::Entity::find()
            .order_by_asc(cache_node::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn upsert_cache_node(&self, node: cache_node::Model) -> Result<(), CatalogError> {
        let model = cache_node::ActiveModel {
            id: Set(node.id),
            name: Set(node.name),
            host: Set(node.host),
            port: Set(node.port),
            ftp_user: Set(node.ftp_user),
            ftp_password: Set(node.ftp_password),
            ftp_path: Set(node.ftp_path),
            http_url: Set(node.http_url),
            external_ip: Set(node.external_ip),
        };

        cache_node::Entity::insert(model)
            .on_conflict(
                OnConflict::column(cache_node::Column::Id)
                    .update_columns([
                        cache_node::Column::Name,
                        cache_node::Column::Host,
                        cache_node::Column::Port,
                        cache_node::Column::FtpUser,
                        cache_node::Column::FtpPassword,
                        cache_node::Column::FtpPath,
                        cache_node::Column::HttpUrl,
                        cache_node::Column::ExternalIp,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }
}
