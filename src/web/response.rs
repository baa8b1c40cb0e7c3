//! Response envelopes and error mapping.
//!
//! Every response body is `{statusCode, message, ...payload}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::error::{ErrorKind, IntrospectError};

/// Status code for each core failure kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::ConnectionFailure => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::QueryFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn default_message(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::ConnectionFailure => "Failed to connect to the database",
        ErrorKind::QueryFailure => "Failed to execute the database query",
    }
}

/// A successful response with payload `T` flattened into the envelope.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
    #[serde(flatten)]
    pub payload: T,
}

/// Payload for responses that carry nothing beyond the envelope.
#[derive(Debug, Default, Serialize)]
pub struct NoPayload {}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, payload: T) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            message: message.into(),
            payload,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// An error response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 for a malformed request (missing or invalid parameters).
    pub fn bad_request(reason: impl std::fmt::Display) -> Self {
        Self::new(StatusCode::BAD_REQUEST, reason.to_string())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<IntrospectError> for ApiError {
    fn from(err: IntrospectError) -> Self {
        let kind = err.kind();
        let message = if err.message().is_empty() {
            default_message(kind).to_string()
        } else {
            err.message().to_string()
        };
        Self::new(status_for(kind), message)
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    #[serde(rename = "statusCode")]
    status_code: u16,
    message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(status = self.status.as_u16(), message = %self.message, "request failed");
        }
        let body = ErrorBody {
            status_code: self.status.as_u16(),
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
