use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use common::transfer::TransferError;
use sea_orm::DbErr;
use serde::Serialize;

use crate::catalog::CatalogError;
use crate::services::dispatcher::DispatchError;
use crate::services::publish::PublishError;
use crate::services::replication::RemovalError;
use crate::services::selector::SelectionError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `NOT_FOUND`,
    /// `CONFLICT`, `TRANSFER_ERROR`, `LOCAL_IO_ERROR`, `TIMEOUT`,
    /// `INTERNAL_ERROR`.
    #[schema(example = "NOT_FOUND")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "No download available for platform win32 for version 1.0.0")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    /// A cache node could not be reached or refused an operation.
    Transfer(String),
    /// A file on the origin node could not be read.
    LocalIo(String),
    Timeout,
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::Transfer(msg) => {
                tracing::error!("Transfer error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody {
                        code: "TRANSFER_ERROR",
                        message: msg,
                    },
                )
            }
            AppError::LocalIo(detail) => {
                tracing::error!("Local file error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "LOCAL_IO_ERROR",
                        message: "The file could not be read from storage".into(),
                    },
                )
            }
            AppError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                ErrorBody {
                    code: "TIMEOUT",
                    message: "The request took too long to complete".into(),
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Conflict(msg) => AppError::Conflict(msg),
            CatalogError::Query(detail) => AppError::Internal(detail),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::SizeLimitExceeded { limit, .. } => {
                AppError::Validation(format!("File exceeds maximum size of {limit} bytes"))
            }
            StorageError::NotFound(_) | StorageError::Io(_) => AppError::LocalIo(err.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        AppError::Transfer(err.to_string())
    }
}

impl From<SelectionError> for AppError {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::NoPlatformDetected | SelectionError::InvalidPlatform(_) => {
                AppError::Validation(err.to_string())
            }
            SelectionError::NotFound(ctx) => AppError::NotFound(ctx.to_string()),
            SelectionError::Catalog(e) => e.into(),
        }
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Storage(e) => e.into(),
            DispatchError::Catalog(e) => e.into(),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<PublishError> for AppError {
    fn from(err: PublishError) -> Self {
        match err {
            PublishError::InvalidVersion(_) | PublishError::InvalidPlatform(_) => {
                AppError::Validation(err.to_string())
            }
            PublishError::Storage(e) => e.into(),
            PublishError::Catalog(e) => e.into(),
        }
    }
}

impl From<RemovalError> for AppError {
    fn from(err: RemovalError) -> Self {
        match err {
            RemovalError::Transfer(e) => e.into(),
            RemovalError::Catalog(e) => e.into(),
            RemovalError::Storage(e) => AppError::LocalIo(e.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}
