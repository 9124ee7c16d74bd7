//! Gantry Kube - Kubernetes integration for the Gantry API server
//!
//! This crate provides everything between the validated request and the
//! cluster:
//! - `resources`: the Workspace and Module custom resource types
//! - `ControlPlane`: the client trait (create, update with conflict retry,
//!   delete, paged list) consumed by the API layer
//! - `KubeControlPlane`: the kube-backed implementation
//! - `MockControlPlane`: in-memory implementation for tests

pub mod client;
pub mod error;
pub mod mock;
pub mod resources;

pub use client::{
    ControlPlane, KUBECONFIG_ROLE, KubeControlPlane, ObjectKey, Page, PageRequest, ROLE_LABEL,
    with_conflict_retry,
};
pub use error::{KubeError, Result};
pub use mock::{MockControlPlane, OperationCounts};
pub use resources::{
    AutoHibernation, ChartGit, ChartRepository, ChartSource, ConfigMapSource,
    ExistingHelmRelease, HelmOutput, HelmValueSource, Module, ModuleSource, ModuleSpec,
    ModuleStatus, ResourceReference, SecretKeySelector, Workspace, WorkspaceConnection,
    WorkspaceConnectionType, WorkspaceSpec, WorkspaceStatus, WorkspaceType,
};
