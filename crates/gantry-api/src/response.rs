//! Response envelopes
//!
//! Every response carries a stable machine-readable code next to its
//! payload. Exactly one side of the envelope is populated; the other is
//! serialized as null so clients can key on presence.

use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessCode {
    Ok,
    Created,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InternalError,
    NotFound,
    BadRequest,
    UnsupportedMediaType,
    MalformedJsonBody,
    BodyValidation,
    QueryValidation,
    FormDataTooLarge,
}

#[derive(Debug, Serialize)]
pub struct SuccessBody {
    pub code: SuccessCode,
    pub data: JsonValue,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub data: JsonValue,
}

#[derive(Debug, Serialize)]
pub struct Envelope {
    pub success: Option<SuccessBody>,
    pub error: Option<ErrorBody>,
}

impl Envelope {
    pub fn success(code: SuccessCode, data: impl Serialize) -> Self {
        Self {
            success: Some(SuccessBody {
                code,
                data: serde_json::to_value(data).unwrap_or(JsonValue::Null),
            }),
            error: None,
        }
    }

    pub fn error(code: ErrorCode, data: impl Serialize) -> Self {
        Self {
            success: None,
            error: Some(ErrorBody {
                code,
                data: serde_json::to_value(data).unwrap_or(JsonValue::Null),
            }),
        }
    }
}

/// 200 with an `ok` envelope.
pub fn ok(data: impl Serialize) -> (StatusCode, Json<Envelope>) {
    (
        StatusCode::OK,
        Json(Envelope::success(SuccessCode::Ok, data)),
    )
}

/// 201 with a `created` envelope.
pub fn created(data: impl Serialize) -> (StatusCode, Json<Envelope>) {
    (
        StatusCode::CREATED,
        Json(Envelope::success(SuccessCode::Created, data)),
    )
}

/// 204, no body.
pub fn deleted() -> StatusCode {
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_populates_exactly_one_side() {
        let success = serde_json::to_value(Envelope::success(SuccessCode::Ok, "hi")).unwrap();
        assert_eq!(success["success"]["code"], "ok");
        assert_eq!(success["error"], JsonValue::Null);

        let error = serde_json::to_value(Envelope::error(
            ErrorCode::BodyValidation,
            json!({"field": "message"}),
        ))
        .unwrap();
        assert_eq!(error["error"]["code"], "body_validation");
        assert_eq!(error["success"], JsonValue::Null);
    }

    #[test]
    fn test_error_codes_are_snake_case() {
        let code = serde_json::to_value(ErrorCode::UnsupportedMediaType).unwrap();
        assert_eq!(code, "unsupported_media_type");
        let code = serde_json::to_value(ErrorCode::FormDataTooLarge).unwrap();
        assert_eq!(code, "form_data_too_large");
    }
}
