//! Resolution of loosely specified download requests to exactly one artifact.

use std::fmt;

use thiserror::Error;

use crate::catalog::{ArtifactFilter, Catalog, CatalogError};
use crate::entity::asset;
use crate::utils::filename::requested_filetype;
use crate::utils::platform;

/// Raw download request fields as they arrive from the router.
#[derive(Debug, Clone, Default)]
pub struct SelectionRequest {
    /// Comma-separated platform tokens, e.g. `win32-x64` or `osx,linux`.
    pub platform: Option<String>,
    pub user_agent: Option<String>,
    pub filetype: Option<String>,
    pub filename: Option<String>,
    pub version: Option<String>,
    pub channel: Option<String>,
}

/// Normalized selection criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCriteria {
    pub platforms: Vec<String>,
    pub filetype: Option<String>,
    pub filename: Option<String>,
    pub version: Option<String>,
    pub channel: Option<String>,
    pub cache_id: i32,
}

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("No platform was specified and none could be detected")]
    NoPlatformDetected,
    #[error("Unparseable platform '{0}'")]
    InvalidPlatform(String),
    #[error("{0}")]
    NotFound(NotFoundContext),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// What was asked for when nothing matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundContext {
    pub platforms: Vec<String>,
    pub version: Option<String>,
    pub channel: Option<String>,
    pub filename: Option<String>,
    pub filetype: Option<String>,
}

impl fmt::Display for NotFoundContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.platforms.len() > 1 {
            "platforms"
        } else {
            "platform"
        };
        write!(
            f,
            "No download available for {noun} {}",
            self.platforms.join(", ")
        )?;
        if let Some(version) = &self.version {
            write!(f, " for version {version}")?;
        }
        if let Some(channel) = &self.channel {
            write!(f, " ({channel})")?;
        }
        if let Some(filename) = &self.filename {
            write!(f, " with filename {filename}")?;
        }
        if let Some(filetype) = &self.filetype {
            write!(f, " with filetype {filetype}")?;
        }
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl SelectionCriteria {
    /// Normalize a request for the client's cache node.
    ///
    /// `default_channel` applies only when neither version nor channel was
    /// requested; `None` leaves such a request unconstrained.
    pub fn from_request(
        request: &SelectionRequest,
        cache_id: i32,
        default_channel: Option<&str>,
    ) -> Result<Self, SelectionError> {
        let filename = non_empty(request.filename.as_deref());
        let filetype = requested_filetype(request.filetype.as_deref(), filename.as_deref());

        let platforms = match non_empty(request.platform.as_deref()) {
            Some(raw) => {
                let tokens: Vec<&str> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect();
                platform::sanitize(&tokens).map_err(SelectionError::InvalidPlatform)?
            }
            None => request
                .user_agent
                .as_deref()
                .and_then(platform::detect_from_user_agent)
                .ok_or(SelectionError::NoPlatformDetected)?,
        };

        let version = non_empty(request.version.as_deref());
        let mut channel = non_empty(request.channel.as_deref());
        if version.is_none() && channel.is_none() {
            channel = non_empty(default_channel);
        }

        Ok(Self {
            platforms,
            filetype,
            filename,
            version,
            channel,
            cache_id,
        })
    }

    fn filter(&self) -> ArtifactFilter {
        ArtifactFilter {
            platforms: self.platforms.clone(),
            filetype: self.filetype.clone(),
            cache_id: Some(self.cache_id),
        }
    }

    fn not_found(&self) -> SelectionError {
        SelectionError::NotFound(NotFoundContext {
            platforms: self.platforms.clone(),
            version: self.version.clone(),
            channel: self.channel.clone(),
            filename: self.filename.clone(),
            filetype: self.filetype.clone(),
        })
    }
}

pub struct ArtifactSelector<'a> {
    catalog: &'a dyn Catalog,
}

impl<'a> ArtifactSelector<'a> {
    pub fn new(catalog: &'a dyn Catalog) -> Self {
        Self { catalog }
    }

    pub async fn select(
        &self,
        criteria: &SelectionCriteria,
    ) -> Result<asset::Model, SelectionError> {
        let filter = criteria.filter();

        if criteria.version.is_some() || criteria.channel.is_some() {
            let Some(version) = self
                .catalog
                .latest_version(criteria.version.as_deref(), criteria.channel.as_deref())
                .await?
            else {
                return Err(criteria.not_found());
            };

            let artifacts = self.catalog.version_artifacts(version.id, &filter).await?;
            return preferred_artifact(artifacts).ok_or_else(|| criteria.not_found());
        }

        self.catalog
            .latest_artifact(&filter)
            .await?
            .filter(|artifact| !artifact.fd.is_empty())
            .ok_or_else(|| criteria.not_found())
    }
}

/// Lowest filetype first, newest first among equal filetypes.
fn preferred_artifact(mut artifacts: Vec<asset::Model>) -> Option<asset::Model> {
    artifacts.retain(|a| !a.fd.is_empty());
    artifacts.sort_by(|a, b| {
        a.filetype
            .cmp(&b.filetype)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    artifacts.into_iter().next()
}
