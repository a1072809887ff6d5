/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - RepoError / AuthError を統一的に変換
 *
 * Body
 * - auth 失敗: {success: false, code, description}  (AuthError に委譲)
 * - それ以外 : {success: false, error: <status>, message}
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::AuthError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: u16,
    pub message: &'static str,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("unprocessable: {reason}")]
    Unprocessable { reason: String },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn unprocessable(reason: impl Into<String>) -> Self {
        Self::Unprocessable {
            reason: reason.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Auth(err) => return err.into_response(),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "resource_not_found"),
            AppError::Unprocessable { reason } => {
                tracing::debug!(reason = %reason, "unprocessable request");
                (StatusCode::UNPROCESSABLE_ENTITY, "unprocessable")
            }
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal_server_error"),
        };

        let body = ErrorResponse {
            success: false,
            error: status.as_u16(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::unprocessable("a drink with this title already exists"),
            RepoError::Db(_) | RepoError::EncodeRecipe(_) | RepoError::CorruptRecipe { .. } => {
                tracing::error!(error = %e, "drink store failure");
                AppError::Internal
            }
        }
    }
}
