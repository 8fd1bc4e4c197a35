/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - AuthError を 401 / 403 / extra validation の status に統一的に変換
 *
 * Body shape:
 *   { "statusCode": 403, "error": "Forbidden", "message": "Forbidden" }
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::AuthError;

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub error: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("{status}: {message}")]
    Rejected { status: StatusCode, message: String },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Rejected { status, .. } => *status,
        }
    }

    pub fn body(&self) -> ErrorResponse {
        let status = self.status();
        let reason = status.canonical_reason().unwrap_or("Unknown");

        // 通常は reason phrase をそのまま message にする
        let message = match self {
            AppError::Rejected { message, .. } => message.clone(),
            _ => reason.to_string(),
        };

        ErrorResponse {
            status_code: status.as_u16(),
            error: reason.to_string(),
            message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingCredential => AppError::Unauthorized,
            AuthError::MalformedScheme { .. } | AuthError::InvalidToken { .. } => {
                AppError::Forbidden
            }
            AuthError::Rejected(rejection) => AppError::Rejected {
                status: rejection.status,
                message: rejection.message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::{CodecError, Rejection};

    #[test]
    fn auth_errors_map_to_status_and_body() {
        let body = AppError::from(AuthError::MissingCredential).body();
        assert_eq!(
            body,
            ErrorResponse {
                status_code: 401,
                error: "Unauthorized".into(),
                message: "Unauthorized".into(),
            }
        );

        let body = AppError::from(AuthError::InvalidToken {
            source_label: "header",
            error: CodecError::Decrypt,
        })
        .body();
        assert_eq!(body.status_code, 403);
        assert_eq!(body.error, "Forbidden");
        assert_eq!(body.message, "Forbidden");
    }

    #[test]
    fn rejection_keeps_status_and_message() {
        let err = AppError::from(AuthError::Rejected(Rejection::new(
            StatusCode::IM_A_TEAPOT,
            "short and stout",
        )));
        let body = err.body();

        assert_eq!(body.status_code, 418);
        assert_eq!(body.error, "I'm a teapot");
        assert_eq!(body.message, "short and stout");
    }

    #[test]
    fn body_serializes_with_camel_case_keys() {
        let json = serde_json::to_value(AppError::Forbidden.body()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "statusCode": 403, "error": "Forbidden", "message": "Forbidden" })
        );
    }
}
