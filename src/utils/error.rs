use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // O amoCRM só precisa saber que falhou: tudo vira 500 genérico
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let error_message = match self {
            AppError::ConfigError(msg) => msg,
            AppError::JsonError(err) => format!("Invalid payload: {}", err),
            AppError::StorageError(msg) => msg,
        };

        let body = json!({
            "error": error_message,
            "status": status.as_u16()
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_is_server_error() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_display_prefixes_kind() {
        let err = AppError::StorageError("disk full".to_string());
        assert_eq!(err.to_string(), "Storage error: disk full");
    }
}
