//! HTTP error responses for web adapter.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::domain::error::TradebookError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
}

impl WebError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NotFound", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "InvalidInput", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal", message)
    }
}

pub fn status_from_error(err: &TradebookError) -> StatusCode {
    match err {
        TradebookError::InvalidRange { .. }
        | TradebookError::InvalidValue { .. }
        | TradebookError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        TradebookError::NotFound { .. } => StatusCode::NOT_FOUND,
        TradebookError::Conflict { .. } => StatusCode::CONFLICT,
        TradebookError::Database { .. }
        | TradebookError::DatabaseQuery { .. }
        | TradebookError::ConfigParse { .. }
        | TradebookError::ConfigMissing { .. }
        | TradebookError::ConfigInvalid { .. }
        | TradebookError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<TradebookError> for WebError {
    fn from(err: TradebookError) -> Self {
        let status = status_from_error(&err);
        if status.is_server_error() {
            log::error!("request failed: {err}");
        }
        Self::new(status, err.kind(), err.to_string())
    }
}

/// Unreadable bodies and query strings share the JSON error shape.
impl From<JsonRejection> for WebError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for WebError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind,
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
