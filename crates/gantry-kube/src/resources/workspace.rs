//! Workspace custom resource

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ResourceReference;

/// Desired state of a tenant workspace: a logical or physical cluster
/// binding, how to reach it, and its hibernation policy.
#[derive(CustomResource, Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "batch.gantry.dev",
    version = "v1",
    kind = "Workspace",
    namespaced,
    status = "WorkspaceStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSpec {
    #[serde(default, rename = "type")]
    pub workspace_type: WorkspaceType,

    /// Workspace this one was forked from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ResourceReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hibernated: Option<bool>,

    pub connection: WorkspaceConnection,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_hibernation: Option<AutoHibernation>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceType {
    #[default]
    Kubernetes,
}

/// How the platform reaches the workspace's cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConnection {
    #[serde(rename = "type")]
    pub connection_type: WorkspaceConnectionType,

    /// Secret holding the kubeconfig; set only for kubeconfig connections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_reference: Option<ResourceReference>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum WorkspaceConnectionType {
    InCluster,
    Kubeconfig,
    Local,
}

/// Cron-driven sleep/wake policy, enforced by the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutoHibernation {
    pub enabled: bool,
    pub schedule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wake_schedule: Option<String>,
}

/// Observed state reported by the operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceStatus {
    #[serde(default)]
    pub phase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
