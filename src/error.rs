//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing reference: {kind} id '{id}'")]
    MissingReference { kind: &'static str, id: String },
    #[error("invalid primary key: table {table_id} column {column}")]
    InvalidPrimaryKey { table_id: String, column: String },
    #[error("duplicate path segment: {0}")]
    DuplicatePathSegment(String),
    #[error("config load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation: {0}")]
    Validation(String),
    /// Include name with no registered handler. Raised at query-build time,
    /// before any storage access.
    #[error("unknown include: {0}")]
    UnknownInclude(String),
    /// Request could not be assembled (endpoint interpolation, connector
    /// resolution). Raised before any network activity.
    #[error("construction: {0}")]
    Construction(String),
    /// The external transport returned a non-success status or failed to
    /// connect. Never retried or recovered here.
    #[error("external service {service}: {message}")]
    ExternalService {
        service: &'static str,
        status: Option<u16>,
        message: String,
    },
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::UnknownInclude(_) => (StatusCode::BAD_REQUEST, "unknown_include"),
            AppError::Construction(_) => (StatusCode::INTERNAL_SERVER_ERROR, "construction_error"),
            AppError::ExternalService { .. } => (StatusCode::BAD_GATEWAY, "external_service_error"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let cases: Vec<(AppError, StatusCode)> = vec![
            (AppError::NotFound("proposals/9".into()), StatusCode::NOT_FOUND),
            (AppError::Validation("title is required".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::UnknownInclude("votes".into()), StatusCode::BAD_REQUEST),
            (AppError::Construction("no connector for 'vimeo'".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                AppError::ExternalService {
                    service: "blockfrost",
                    status: Some(429),
                    message: "rate limited".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (AppError::BadRequest("invalid id".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
