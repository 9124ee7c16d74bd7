//! Request handlers
//!
//! Every handler runs the same sequence: assemble the document, validate it
//! against the operation's schema, project the DTO into a resource spec,
//! submit it, wrap the outcome in the response envelope. Business logic
//! lives in the layers below, never here.

pub mod module;
pub mod workspace;

use gantry_core::{Document, Schema, validate_into};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub(crate) fn validate_body<T: DeserializeOwned>(
    document: &Document,
    schema: &Schema,
) -> Result<T, ApiError> {
    validate_into(document, schema).map_err(ApiError::from_body_validation)
}

pub(crate) fn validate_query<T: DeserializeOwned>(
    document: &Document,
    schema: &Schema,
) -> Result<T, ApiError> {
    validate_into(document, schema).map_err(ApiError::from_query_validation)
}
