//! Workspace handlers

use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use gantry_kube::ObjectKey;
use serde::Serialize;

use crate::error::ApiError;
use crate::extract;
use crate::project;
use crate::requests::{
    CreateKubeconfigSecretRequest, CreateWorkspaceRequest, DeleteKubeconfigSecretRequest,
    DeleteWorkspaceRequest, ListQuery, UpdateWorkspaceRequest,
};
use crate::response::{self, Envelope};
use crate::state::AppState;

use super::{validate_body, validate_query};

#[derive(Debug, Serialize)]
pub struct WorkspaceResponse {
    pub name: String,
    pub namespace: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceListResponse {
    pub continue_token: String,
    pub workspaces: Vec<project::WorkspaceListItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KubeconfigSecretListResponse {
    pub continue_token: String,
    pub secrets: Vec<project::KubeconfigSecretListItem>,
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Envelope>), ApiError> {
    let document = extract::json_document(&headers, &body)?;
    let request: CreateWorkspaceRequest =
        validate_body(&document, &state.registry.create_workspace)?;

    let workspace = project::workspace(&request);
    let stored = state.control.create_workspace(workspace).await?;

    tracing::info!(name = %request.name, "workspace created");
    Ok(response::created(WorkspaceResponse {
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
    let request: UpdateWorkspaceRequest =
        validate_body(&document, &state.registry.update_workspace)?;

    let key = ObjectKey::new(
        request.name.clone(),
        project::namespace_or_default(&request.namespace),
    );
    let mutate = |workspace: &mut gantry_kube::Workspace| {
        project::apply_workspace_update(&request, workspace);
    };
    let stored = state.control.update_workspace(&key, &mutate).await?;

    Ok(response::ok(WorkspaceResponse {
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
    let request: DeleteWorkspaceRequest =
        validate_body(&document, &state.registry.delete_workspace)?;

    let key = ObjectKey::new(
        request.name.clone(),
        project::namespace_or_default(&request.namespace),
    );
    state.control.delete_workspace(&key).await?;

    tracing::info!(name = %request.name, "workspace deleted");
    Ok(response::deleted())
}

pub async fn list(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<(StatusCode, Json<Envelope>), ApiError> {
    let document = extract::query_document(query.as_deref());
    let request: ListQuery = validate_query(&document, &state.registry.list_query)?;

    let page = state.control.list_workspaces(&request.page()).await?;

    Ok(response::ok(WorkspaceListResponse {
        continue_token: page.continue_token.unwrap_or_default(),
        workspaces: page.items.iter().map(project::workspace_list_item).collect(),
    }))
}

pub async fn create_kubeconfig_secret(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Envelope>), ApiError> {
    extract::check_form_size(&headers)?;
    let mut multipart = multipart.map_err(|_| ApiError::UnsupportedMediaType {
        expected: extract::MULTIPART_MEDIA_TYPE,
    })?;

    let document = extract::kubeconfig_form_document(&mut multipart).await?;
    let request: CreateKubeconfigSecretRequest =
        validate_body(&document, &state.registry.create_kubeconfig_secret)?;

    let secret = project::kubeconfig_secret(&request);
    let stored = state.control.create_kubeconfig_secret(secret).await?;

    tracing::info!(name = %request.name, "kubeconfig secret created");
    Ok(response::created(stored.metadata.uid.unwrap_or_default()))
}

pub async fn delete_kubeconfig_secret(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let document = extract::json_document(&headers, &body)?;
    let request: DeleteKubeconfigSecretRequest =
        validate_body(&document, &state.registry.delete_kubeconfig_secret)?;

    let key = ObjectKey::new(
        request.name.clone(),
        project::namespace_or_default(&request.namespace),
    );
    state.control.delete_kubeconfig_secret(&key).await?;

    Ok(response::deleted())
}

pub async fn list_kubeconfig_secrets(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<(StatusCode, Json<Envelope>), ApiError> {
    let document = extract::query_document(query.as_deref());
    let request: ListQuery = validate_query(&document, &state.registry.list_query)?;

    let page = state.control.list_kubeconfig_secrets(&request.page()).await?;

    Ok(response::ok(KubeconfigSecretListResponse {
        continue_token: page.continue_token.unwrap_or_default(),
        secrets: page
            .items
            .iter()
            .map(project::kubeconfig_secret_list_item)
            .collect(),
    }))
}
