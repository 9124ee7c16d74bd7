//! Transport document assembly
//!
//! Each entry point turns its wire format into a `Document` before the
//! transport-agnostic engine runs: JSON bodies decode, multipart forms and
//! query strings synthesize key/value pairs. Shape problems (content type,
//! decode failures, size caps) are rejected here with their own error
//! codes; they never reach validation as field violations.

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::HeaderMap;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use gantry_core::Document;

use crate::error::ApiError;

pub const JSON_MEDIA_TYPE: &str = "application/json";
pub const MULTIPART_MEDIA_TYPE: &str = "multipart/form-data";

/// Upload cap for kubeconfig form submissions: 10 MiB.
pub const MAX_FORM_BYTES: usize = 10 << 20;

/// Assemble a document from a JSON body, enforcing the media type.
pub fn json_document(headers: &HeaderMap, body: &[u8]) -> Result<Document, ApiError> {
    if media_type(headers) != JSON_MEDIA_TYPE {
        return Err(ApiError::UnsupportedMediaType {
            expected: JSON_MEDIA_TYPE,
        });
    }

    Document::from_json_slice(body).map_err(|_| ApiError::MalformedBody)
}

/// Assemble a document from the raw query string.
pub fn query_document(query: Option<&str>) -> Document {
    let raw = query.unwrap_or("");
    Document::from_pairs(
        url::form_urlencoded::parse(raw.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned())),
    )
}

/// Assemble a document from the kubeconfig upload form: the `name` field
/// plus the `kubeconfig` file content. Missing parts surface later as
/// `required` violations, same as any other absent field.
pub async fn kubeconfig_form_document(multipart: &mut Multipart) -> Result<Document, ApiError> {
    let mut name = None;
    let mut kubeconfig = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("name") => name = Some(field.text().await.map_err(multipart_error)?),
            Some("kubeconfig") => kubeconfig = Some(field.text().await.map_err(multipart_error)?),
            _ => {}
        }
    }

    let mut pairs = Vec::new();
    if let Some(name) = name {
        pairs.push(("name", name));
    }
    if let Some(kubeconfig) = kubeconfig {
        pairs.push(("kubeconfig", kubeconfig));
    }
    Ok(Document::from_pairs(pairs))
}

/// Reject oversized uploads up front when the client declares a length.
/// Chunked bodies are caught by the body limit while streaming instead.
pub fn check_form_size(headers: &HeaderMap) -> Result<(), ApiError> {
    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    match declared {
        Some(length) if length > MAX_FORM_BYTES => Err(ApiError::FormDataTooLarge {
            limit: MAX_FORM_BYTES,
        }),
        _ => Ok(()),
    }
}

fn media_type(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

fn multipart_error(err: MultipartError) -> ApiError {
    // The streaming body limit reports overflow as a read failure; the
    // message is the only discriminator multer exposes.
    let message = err.to_string();
    if message.contains("exceeded") || message.contains("too large") {
        ApiError::FormDataTooLarge {
            limit: MAX_FORM_BYTES,
        }
    } else {
        ApiError::MalformedBody
    }
}
