//! Module request DTOs and schemas
//!
//! The module source is the deepest shape in the API: a four-branch oneof
//! whose existing-Helm-release branch nests a chart-source oneof and
//! value/output source oneofs of its own.

use gantry_core::{Exclusivity, Field, Kind, Patch, Schema, UnionSchema, validators};
use serde::Deserialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::{ReferenceDto, reference_schema};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateModuleRequest {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    pub workspace: ReferenceDto,
    pub source: ModuleSourceDto,
    #[serde(default)]
    pub config: Option<JsonMap<String, JsonValue>>,
    #[serde(default)]
    pub hibernated: bool,
}

/// Exactly one branch is populated; validation enforces it before this
/// type is ever constructed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSourceDto {
    /// Inline module manifest as YAML text.
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default, rename = "httpURL")]
    pub http_url: Option<String>,
    #[serde(default)]
    pub config_map: Option<ConfigMapRefDto>,
    #[serde(default)]
    pub existing_helm_release: Option<ExistingHelmReleaseDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapRefDto {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingHelmReleaseDto {
    pub name: String,
    pub namespace: String,
    pub chart_source: ChartSourceDto,
    #[serde(default)]
    pub values: Vec<ValueSourceDto>,
    #[serde(default)]
    pub outputs: Vec<OutputDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSourceDto {
    #[serde(default)]
    pub repository: Option<ChartRepositoryDto>,
    #[serde(default)]
    pub config_map: Option<ConfigMapRefDto>,
    #[serde(default)]
    pub git: Option<ChartGitDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRepositoryDto {
    pub url: String,
    pub chart: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartGitDto {
    pub repo: String,
    pub path: String,
    pub revision: String,
}

/// One values overlay: a literal map or a secret reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueSourceDto {
    #[serde(default)]
    pub raw: Option<JsonMap<String, JsonValue>>,
    #[serde(default)]
    pub secret_ref: Option<SecretKeyRefDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeyRefDto {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub key: Option<String>,
}

/// A named value exported by the release.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputDto {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub secret_key_ref: Option<SecretKeyRefDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateModuleRequest {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub hibernated: Patch<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteModuleRequest {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

pub(crate) fn create_module_schema() -> Schema {
    Schema::new(
        "CreateModuleRequest",
        vec![
            Field::required("name", Kind::String).check(validators::DNS1123_SUBDOMAIN),
            Field::optional("namespace", Kind::String).check(validators::DNS1123_LABEL),
            Field::required(
                "workspace",
                Kind::Object(reference_schema("WorkspaceReference")),
            ),
            Field::required("source", Kind::Union(module_source_union())),
            Field::optional("config", Kind::Map),
            Field::optional("hibernated", Kind::Boolean),
        ],
    )
}

fn module_source_union() -> UnionSchema {
    UnionSchema::new(
        Exclusivity::ExactlyOne,
        vec![
            Field::optional("raw", Kind::String).check(validators::YAML_DOCUMENT),
            Field::optional("httpURL", Kind::String).check(validators::HTTP_URL),
            Field::optional(
                "configMap",
                Kind::Object(config_map_ref_schema("ConfigMapSource")),
            ),
            Field::optional(
                "existingHelmRelease",
                Kind::Object(existing_helm_release_schema()),
            ),
        ],
    )
}

fn config_map_ref_schema(name: &'static str) -> Schema {
    Schema::new(
        name,
        vec![
            Field::required("name", Kind::String).check(validators::DNS1123_SUBDOMAIN),
            Field::required("namespace", Kind::String).check(validators::DNS1123_LABEL),
            Field::optional("key", Kind::String),
        ],
    )
}

fn existing_helm_release_schema() -> Schema {
    Schema::new(
        "ExistingHelmRelease",
        vec![
            Field::required("name", Kind::String).check(validators::DNS1123_SUBDOMAIN),
            Field::required("namespace", Kind::String).check(validators::DNS1123_LABEL),
            Field::required("chartSource", Kind::Union(chart_source_union())),
            Field::optional(
                "values",
                Kind::List(Box::new(Kind::Union(value_source_union()))),
            ),
            Field::optional("outputs", Kind::List(Box::new(Kind::Object(output_schema())))),
        ],
    )
}

fn chart_source_union() -> UnionSchema {
    UnionSchema::new(
        Exclusivity::ExactlyOne,
        vec![
            Field::optional("repository", Kind::Object(chart_repository_schema())),
            Field::optional(
                "configMap",
                Kind::Object(config_map_ref_schema("ChartConfigMap")),
            ),
            Field::optional("git", Kind::Object(chart_git_schema())),
        ],
    )
}

fn chart_repository_schema() -> Schema {
    Schema::new(
        "ChartRepository",
        vec![
            Field::required("url", Kind::String).check(validators::HTTP_URL),
            Field::required("chart", Kind::String),
            Field::optional("version", Kind::String),
        ],
    )
}

fn chart_git_schema() -> Schema {
    Schema::new(
        "ChartGit",
        vec![
            Field::required("repo", Kind::String),
            Field::required("path", Kind::String),
            Field::required("revision", Kind::String),
        ],
    )
}

fn value_source_union() -> UnionSchema {
    UnionSchema::new(
        Exclusivity::ExactlyOne,
        vec![
            Field::optional("raw", Kind::Map),
            Field::optional(
                "secretRef",
                Kind::Object(secret_key_ref_schema("ValuesSecretRef")),
            ),
        ],
    )
}

fn secret_key_ref_schema(name: &'static str) -> Schema {
    Schema::new(
        name,
        vec![
            Field::required("name", Kind::String).check(validators::DNS1123_SUBDOMAIN),
            Field::required("namespace", Kind::String).check(validators::DNS1123_LABEL),
            Field::optional("key", Kind::String),
        ],
    )
}

fn output_schema() -> Schema {
    Schema::new(
        "HelmOutput",
        vec![
            Field::required("name", Kind::String).check(validators::DNS1035_LABEL),
            Field::optional("value", Kind::String),
            Field::optional(
                "secretKeyRef",
                Kind::Object(secret_key_ref_schema("OutputSecretRef")),
            ),
        ],
    )
    .check(validators::OUTPUT_SOURCE_EXCLUSIVE)
}

pub(crate) fn update_module_schema() -> Schema {
    Schema::new(
        "UpdateModuleRequest",
        vec![
            Field::required("name", Kind::String).check(validators::DNS1123_SUBDOMAIN),
            Field::optional("namespace", Kind::String).check(validators::DNS1123_LABEL),
            Field::nullable("hibernated", Kind::Boolean),
        ],
    )
}

pub(crate) fn delete_module_schema() -> Schema {
    Schema::new(
        "DeleteModuleRequest",
        vec![
            Field::required("name", Kind::String).check(validators::DNS1123_SUBDOMAIN),
            Field::optional("namespace", Kind::String).check(validators::DNS1123_LABEL),
        ],
    )
}
