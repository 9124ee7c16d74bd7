//! Module handlers

use axum::Json;
use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use gantry_kube::ObjectKey;
use serde::Serialize;

use crate::error::ApiError;
use crate::extract;
use crate::project;
use crate::requests::{
    CreateModuleRequest, DeleteModuleRequest, ListQuery, UpdateModuleRequest,
};
use crate::response::{self, Envelope};
use crate::state::AppState;

use super::{validate_body, validate_query};

#[derive(Debug, Serialize)]
pub struct ModuleResponse {
    pub name: String,
    pub namespace: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleListResponse {
    pub continue_token: String,
    pub modules: Vec<project::ModuleListItem>,
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Envelope>), ApiError> {
    let document = extract::json_document(&headers, &body)?;
    let request: CreateModuleRequest = validate_body(&document, &state.registry.create_module)?;

    let module = project::module(&request).map_err(|e| ApiError::Internal(e.to_string()))?;
    let stored = state.control.create_module(module).await?;

    tracing::info!(name = %request.name, workspace = %request.workspace.name, "module created");
    Ok(response::created(ModuleResponse {
        name: stored.metadata.name.unwrap_or_default(),
        namespace: stored.metadata.namespace.unwrap_or_default(),
    }))
}

pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Envelope>), ApiError> {
    let document = extract::json_document(&headers, &body)?;
    let request: UpdateModuleRequest = validate_body(&document, &state.registry.update_module)?;

    let key = ObjectKey::new(
        request.name.clone(),
        project::namespace_or_default(&request.namespace),
    );
    let mutate = |module: &mut gantry_kube::Module| {
        project::apply_module_update(&request, module);
    };
    let stored = state.control.update_module(&key, &mutate).await?;

    Ok(response::ok(ModuleResponse {
        name: stored.metadata.name.unwrap_or_default(),
        namespace: stored.metadata.namespace.unwrap_or_default(),
    }))
}

pub async fn delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let document = extract::json_document(&headers, &body)?;
    let request: DeleteModuleRequest = validate_body(&document, &state.registry.delete_module)?;

    let key = ObjectKey::new(
        request.name.clone(),
        project::namespace_or_default(&request.namespace),
    );
    state.control.delete_module(&key).await?;

    tracing::info!(name = %request.name, "module deleted");
    Ok(response::deleted())
}

pub async fn list(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<(StatusCode, Json<Envelope>), ApiError> {
    let document = extract::query_document(query.as_deref());
    let request: ListQuery = validate_query(&document, &state.registry.list_query)?;

    let page = state.control.list_modules(&request.page()).await?;

    Ok(response::ok(ModuleListResponse {
        continue_token: page.continue_token.unwrap_or_default(),
        modules: page.items.iter().map(project::module_list_item).collect(),
    }))
}
