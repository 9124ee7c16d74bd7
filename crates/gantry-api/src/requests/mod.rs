//! Request DTOs and their schemas
//!
//! Every operation has a typed DTO plus an explicit schema the validation
//! engine interprets. The schemas live in one immutable registry built at
//! startup and injected where needed, so the engine stays testable in
//! isolation and nothing reaches for ambient global state.

mod module;
mod workspace;

pub use module::{
    ChartGitDto, ChartRepositoryDto, ChartSourceDto, ConfigMapRefDto, CreateModuleRequest,
    DeleteModuleRequest, ExistingHelmReleaseDto, ModuleSourceDto, OutputDto, SecretKeyRefDto,
    UpdateModuleRequest, ValueSourceDto,
};
pub use workspace::{
    AutoHibernationDto, ConnectionDto, CreateKubeconfigSecretRequest, CreateWorkspaceRequest,
    DeleteKubeconfigSecretRequest, DeleteWorkspaceRequest, UpdateWorkspaceRequest,
};

use gantry_core::{Field, Kind, Schema, validators};
use gantry_kube::PageRequest;
use serde::{Deserialize, Serialize};

/// All request schemas, built once and shared read-only.
#[derive(Debug)]
pub struct SchemaRegistry {
    pub create_workspace: Schema,
    pub update_workspace: Schema,
    pub delete_workspace: Schema,
    pub create_module: Schema,
    pub update_module: Schema,
    pub delete_module: Schema,
    pub list_query: Schema,
    pub create_kubeconfig_secret: Schema,
    pub delete_kubeconfig_secret: Schema,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            create_workspace: workspace::create_workspace_schema(),
            update_workspace: workspace::update_workspace_schema(),
            delete_workspace: workspace::delete_workspace_schema(),
            create_module: module::create_module_schema(),
            update_module: module::update_module_schema(),
            delete_module: module::delete_module_schema(),
            list_query: list_query_schema(),
            create_kubeconfig_secret: workspace::create_kubeconfig_secret_schema(),
            delete_kubeconfig_secret: workspace::delete_kubeconfig_secret_schema(),
        }
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A (name, namespace) reference as clients submit and receive it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDto {
    pub name: String,
    pub namespace: String,
}

/// Schema for a reference object: subdomain name, label namespace.
pub(crate) fn reference_schema(name: &'static str) -> Schema {
    Schema::new(
        name,
        vec![
            Field::required("name", Kind::String).check(validators::DNS1123_SUBDOMAIN),
            Field::required("namespace", Kind::String).check(validators::DNS1123_LABEL),
        ],
    )
}

/// Default page size when the query names none.
pub const DEFAULT_PAGE_LIMIT: i64 = 25;

/// limit/continueToken query parameters, shared by every list operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub continue_token: Option<String>,
}

impl ListQuery {
    /// Page request for the control plane; the default limit is applied
    /// here, after validation, never inside the engine.
    pub fn page(&self) -> PageRequest {
        PageRequest {
            limit: self.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
            continue_token: self.continue_token.clone(),
        }
    }
}

fn list_query_schema() -> Schema {
    Schema::new(
        "ListQuery",
        vec![
            Field::optional("limit", Kind::Integer).check(validators::PAGE_LIMIT),
            Field::optional("continueToken", Kind::String),
        ],
    )
}
