//! Workspace projections

use std::collections::BTreeMap;

use gantry_kube::{
    AutoHibernation, KUBECONFIG_ROLE, ROLE_LABEL, Workspace, WorkspaceConnection, WorkspaceSpec,
};
use k8s_openapi::ByteString;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::Serialize;

use crate::requests::{
    AutoHibernationDto, CreateKubeconfigSecretRequest, CreateWorkspaceRequest,
    UpdateWorkspaceRequest,
};

use super::{namespace_or_default, reference};

/// Project a create request into a Workspace resource.
pub fn workspace(request: &CreateWorkspaceRequest) -> Workspace {
    let mut workspace = Workspace::new(
        &request.name,
        WorkspaceSpec {
            workspace_type: request.workspace_type.unwrap_or_default(),
            from: request.from.as_ref().map(reference),
            hibernated: Some(request.hibernated),
            connection: WorkspaceConnection {
                connection_type: request.connection.connection_type,
                secret_reference: request.connection.secret.as_ref().map(reference),
            },
            auto_hibernation: request.auto_hibernation.as_ref().map(auto_hibernation),
        },
    );
    workspace.metadata.namespace = Some(namespace_or_default(&request.namespace));
    workspace
}

fn auto_hibernation(dto: &AutoHibernationDto) -> AutoHibernation {
    AutoHibernation {
        enabled: dto.enabled,
        schedule: dto.schedule.clone(),
        wake_schedule: dto.wake_schedule.clone(),
    }
}

/// Apply an update request onto the stored workspace, inside the control
/// plane's read-modify-write sequence. Absent fields stay untouched,
/// explicit nulls clear, values replace.
pub fn apply_workspace_update(request: &UpdateWorkspaceRequest, workspace: &mut Workspace) {
    request
        .hibernated
        .apply_to(&mut workspace.spec.hibernated);
    request
        .auto_hibernation
        .clone()
        .map(|dto| auto_hibernation(&dto))
        .apply_to(&mut workspace.spec.auto_hibernation);
}

/// Project a kubeconfig upload into an Opaque secret carrying the bundle,
/// labelled so it can be listed back.
pub fn kubeconfig_secret(request: &CreateKubeconfigSecretRequest) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(request.name.clone()),
            namespace: Some(super::DEFAULT_NAMESPACE.to_string()),
            labels: Some(BTreeMap::from([(
                ROLE_LABEL.to_string(),
                KUBECONFIG_ROLE.to_string(),
            )])),
            ..ObjectMeta::default()
        },
        type_: Some("Opaque".to_string()),
        data: Some(BTreeMap::from([(
            "kubeconfig".to_string(),
            ByteString(request.kubeconfig.clone().into_bytes()),
        )])),
        ..Secret::default()
    }
}

/// Response item for workspace listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceListItem {
    pub name: String,
    pub namespace: String,
    pub phase: String,
    pub message: String,
    pub hibernated: bool,
    #[serde(rename = "type")]
    pub type_label: String,
}

pub fn workspace_list_item(workspace: &Workspace) -> WorkspaceListItem {
    let status = workspace.status.clone().unwrap_or_default();
    let type_label = serde_json::to_value(workspace.spec.workspace_type)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string());

    WorkspaceListItem {
        name: workspace.metadata.name.clone().unwrap_or_default(),
        namespace: workspace.metadata.namespace.clone().unwrap_or_default(),
        phase: status.phase,
        message: status.message.unwrap_or_default(),
        hibernated: workspace.spec.hibernated.unwrap_or(false),
        type_label,
    }
}

/// Response item for kubeconfig secret listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KubeconfigSecretListItem {
    pub name: String,
    pub namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

pub fn kubeconfig_secret_list_item(secret: &Secret) -> KubeconfigSecretListItem {
    KubeconfigSecretListItem {
        name: secret.metadata.name.clone().unwrap_or_default(),
        namespace: secret.metadata.namespace.clone().unwrap_or_default(),
        created: secret
            .metadata
            .creation_timestamp
            .as_ref()
            .map(|t| t.0.to_rfc3339()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requests::{ConnectionDto, ReferenceDto};
    use gantry_core::Patch;
    use gantry_kube::{WorkspaceConnectionType, WorkspaceType};

    fn create_request() -> CreateWorkspaceRequest {
        CreateWorkspaceRequest {
            name: "dev-cluster".to_string(),
            namespace: None,
            workspace_type: None,
            from: Some(ReferenceDto {
                name: "prod-cluster".to_string(),
                namespace: "platform".to_string(),
            }),
            hibernated: false,
            connection: ConnectionDto {
                connection_type: WorkspaceConnectionType::Kubeconfig,
                secret: Some(ReferenceDto {
                    name: "dev-kubeconfig".to_string(),
                    namespace: "default".to_string(),
                }),
            },
            auto_hibernation: Some(AutoHibernationDto {
                enabled: true,
                schedule: "0 22 * * *".to_string(),
                wake_schedule: None,
            }),
        }
    }

    #[test]
    fn test_defaults_applied() {
        let projected = workspace(&create_request());

        assert_eq!(projected.metadata.namespace.as_deref(), Some("default"));
        assert_eq!(projected.spec.workspace_type, WorkspaceType::Kubernetes);
    }

    #[test]
    fn test_from_reference_projects_verbatim() {
        let projected = workspace(&create_request());

        let from = projected.spec.from.unwrap();
        assert_eq!(from.name, "prod-cluster");
        assert_eq!(from.namespace, "platform");
    }

    #[test]
    fn test_projection_is_deterministic() {
        let request = create_request();

        let first = serde_json::to_vec(&workspace(&request)).unwrap();
        let second = serde_json::to_vec(&workspace(&request)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_update_patch_semantics() {
        let mut stored = workspace(&create_request());
        assert!(stored.spec.auto_hibernation.is_some());

        // Clear auto-hibernation, leave hibernated untouched.
        let update = UpdateWorkspaceRequest {
            name: "dev-cluster".to_string(),
            namespace: None,
            hibernated: Patch::Absent,
            auto_hibernation: Patch::Null,
        };
        apply_workspace_update(&update, &mut stored);

        assert_eq!(stored.spec.hibernated, Some(false));
        assert!(stored.spec.auto_hibernation.is_none());

        // Replace hibernated.
        let update = UpdateWorkspaceRequest {
            name: "dev-cluster".to_string(),
            namespace: None,
            hibernated: Patch::Value(true),
            auto_hibernation: Patch::Absent,
        };
        apply_workspace_update(&update, &mut stored);
        assert_eq!(stored.spec.hibernated, Some(true));
    }

    #[test]
    fn test_kubeconfig_secret_shape() {
        let request = CreateKubeconfigSecretRequest {
            name: "dev-cluster".to_string(),
            kubeconfig: "clusters: []".to_string(),
        };
        let secret = kubeconfig_secret(&request);

        assert_eq!(secret.metadata.name.as_deref(), Some("dev-cluster"));
        assert_eq!(
            secret
                .metadata
                .labels
                .as_ref()
                .and_then(|l| l.get(ROLE_LABEL))
                .map(String::as_str),
            Some(KUBECONFIG_ROLE)
        );
        assert_eq!(
            secret.data.unwrap().get("kubeconfig").unwrap().0,
            b"clusters: []".to_vec()
        );
    }

    #[test]
    fn test_list_item_serializes_type_label() {
        let projected = workspace(&create_request());
        let item = workspace_list_item(&projected);

        assert_eq!(item.type_label, "kubernetes");
        assert_eq!(item.hibernated, false);
    }
}
