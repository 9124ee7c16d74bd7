//! API error type
//!
//! Maps every failure class to its envelope and status code:
//! transport-shape errors (content type, decode, size) and field violations
//! are the client's problem; control-plane refusals come back as a generic
//! rejection with the underlying message attached; everything else is a 500
//! that says nothing useful to the outside.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gantry_core::{CoreError, ViolationReport};
use gantry_kube::KubeError;
use serde_json::{Value as JsonValue, json};
use thiserror::Error;

use crate::response::{Envelope, ErrorCode};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unsupported media type (expected: {expected})")]
    UnsupportedMediaType { expected: &'static str },

    #[error("malformed request body")]
    MalformedBody,

    #[error("form data too large (limit: {limit} bytes)")]
    FormDataTooLarge { limit: usize },

    #[error("request body validation failed")]
    BodyValidation(ViolationReport),

    #[error("request query validation failed")]
    QueryValidation(ViolationReport),

    /// Control-plane refusal, surfaced with the underlying message.
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Core failures from a body document.
    pub(crate) fn from_body_validation(err: CoreError) -> Self {
        match err {
            CoreError::Violations { report, .. } => ApiError::BodyValidation(report),
            CoreError::MalformedDocument(_) | CoreError::RootNotObject { .. } => {
                ApiError::MalformedBody
            }
            CoreError::Decode(e) => ApiError::Internal(e.to_string()),
        }
    }

    /// Core failures from a query document.
    pub(crate) fn from_query_validation(err: CoreError) -> Self {
        match err {
            CoreError::Violations { report, .. } => ApiError::QueryValidation(report),
            CoreError::MalformedDocument(_) | CoreError::RootNotObject { .. } => {
                ApiError::MalformedBody
            }
            CoreError::Decode(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<KubeError> for ApiError {
    fn from(err: KubeError) -> Self {
        if err.is_not_found() {
            ApiError::NotFound(err.to_string())
        } else {
            ApiError::Rejected(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, data) = match self {
            ApiError::UnsupportedMediaType { expected } => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ErrorCode::UnsupportedMediaType,
                json!(format!("Unsupported Media Type (expected: {expected})")),
            ),
            ApiError::MalformedBody => (
                StatusCode::BAD_REQUEST,
                ErrorCode::MalformedJsonBody,
                JsonValue::Null,
            ),
            ApiError::FormDataTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorCode::FormDataTooLarge,
                json!(format!("Form data too large (limit: {limit} bytes)")),
            ),
            ApiError::BodyValidation(report) => (
                StatusCode::BAD_REQUEST,
                ErrorCode::BodyValidation,
                json!(report.to_map()),
            ),
            ApiError::QueryValidation(report) => (
                StatusCode::BAD_REQUEST,
                ErrorCode::QueryValidation,
                json!(report.to_map()),
            ),
            ApiError::Rejected(message) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadRequest, json!(message))
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, ErrorCode::NotFound, json!(message))
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalError,
                    json!("Internal Server Error"),
                )
            }
        };

        (status, Json(Envelope::error(code, data))).into_response()
    }
}
