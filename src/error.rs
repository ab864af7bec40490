use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::database::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Not found")]
    RouteNotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("Database error")]
    Database(#[source] sqlx::Error),
}

/// 启动阶段的错误
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to connect to Postgres: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UserNotFound | AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => AppError::UserNotFound,
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::Database(e) => AppError::Database(e),
        }
    }
}

// 请求体解析失败统一返回 400，附带解析错误信息
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        AppError::BadRequest("Invalid user ID".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::Database(e) = &self {
            tracing::error!("Database error: {:?}", e);
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_status() {
        assert_eq!(
            AppError::from(StoreError::NotFound(7)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(StoreError::Conflict("dup".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(StoreError::Database(sqlx::Error::PoolTimedOut)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages_are_client_safe() {
        assert_eq!(AppError::UserNotFound.to_string(), "User not found");
        assert_eq!(
            AppError::Database(sqlx::Error::PoolTimedOut).to_string(),
            "Database error"
        );
    }
}
