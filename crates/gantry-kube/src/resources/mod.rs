//! Custom resource types submitted to the control plane
//!
//! These are the strongly-typed wire forms under `batch.gantry.dev/v1`. The
//! operator that reconciles them lives outside this repository; this side
//! only produces specs and reads back status.

mod module;
mod workspace;

pub use module::{
    ChartGit, ChartRepository, ChartSource, ConfigMapSource, ExistingHelmRelease, HelmOutput,
    HelmValueSource, Module, ModuleSource, ModuleSpec, ModuleStatus, SecretKeySelector,
};
pub use workspace::{
    AutoHibernation, Workspace, WorkspaceConnection, WorkspaceConnectionType, WorkspaceSpec,
    WorkspaceStatus, WorkspaceType,
};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A (name, namespace) pair linking one object to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReference {
    pub name: String,
    pub namespace: String,
}
