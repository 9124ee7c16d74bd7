//! Workspace request DTOs and schemas

use gantry_core::{Field, Kind, Patch, Schema, validators};
use gantry_kube::{WorkspaceConnectionType, WorkspaceType};
use serde::Deserialize;

use super::{ReferenceDto, reference_schema};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkspaceRequest {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    /// Absent means the sentinel type; the fallback is applied in projection.
    #[serde(default, rename = "type")]
    pub workspace_type: Option<WorkspaceType>,
    #[serde(default)]
    pub from: Option<ReferenceDto>,
    #[serde(default)]
    pub hibernated: bool,
    pub connection: ConnectionDto,
    #[serde(default)]
    pub auto_hibernation: Option<AutoHibernationDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDto {
    #[serde(rename = "type")]
    pub connection_type: WorkspaceConnectionType,
    #[serde(default)]
    pub secret: Option<ReferenceDto>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoHibernationDto {
    #[serde(default)]
    pub enabled: bool,
    pub schedule: String,
    #[serde(default)]
    pub wake_schedule: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkspaceRequest {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub hibernated: Patch<bool>,
    #[serde(default)]
    pub auto_hibernation: Patch<AutoHibernationDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteWorkspaceRequest {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Multipart form: `name` field plus the uploaded kubeconfig file content.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKubeconfigSecretRequest {
    pub name: String,
    pub kubeconfig: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteKubeconfigSecretRequest {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

pub(crate) fn create_workspace_schema() -> Schema {
    Schema::new(
        "CreateWorkspaceRequest",
        vec![
            Field::required("name", Kind::String).check(validators::DNS1123_SUBDOMAIN),
            Field::optional("namespace", Kind::String).check(validators::DNS1123_LABEL),
            Field::optional("type", Kind::String).check(validators::WORKSPACE_TYPE),
            Field::optional("from", Kind::Object(reference_schema("WorkspaceFrom"))),
            Field::optional("hibernated", Kind::Boolean),
            Field::required("connection", Kind::Object(connection_schema())),
            Field::optional("autoHibernation", Kind::Object(auto_hibernation_schema())),
        ],
    )
}

fn connection_schema() -> Schema {
    Schema::new(
        "WorkspaceConnection",
        vec![
            Field::required("type", Kind::String).check(validators::CONNECTION_TYPE),
            Field::optional("secret", Kind::Object(reference_schema("SecretReference"))),
        ],
    )
    .check(validators::KUBECONFIG_SECRET_REQUIRED)
}

fn auto_hibernation_schema() -> Schema {
    Schema::new(
        "AutoHibernation",
        vec![
            Field::optional("enabled", Kind::Boolean),
            Field::required("schedule", Kind::String).check(validators::CRON_SCHEDULE),
            Field::optional("wakeSchedule", Kind::String).check(validators::CRON_SCHEDULE),
        ],
    )
}

pub(crate) fn update_workspace_schema() -> Schema {
    Schema::new(
        "UpdateWorkspaceRequest",
        vec![
            Field::required("name", Kind::String).check(validators::DNS1123_SUBDOMAIN),
            Field::optional("namespace", Kind::String).check(validators::DNS1123_LABEL),
            Field::nullable("hibernated", Kind::Boolean),
            Field::nullable("autoHibernation", Kind::Object(auto_hibernation_schema())),
        ],
    )
}

pub(crate) fn delete_workspace_schema() -> Schema {
    Schema::new(
        "DeleteWorkspaceRequest",
        vec![
            Field::required("name", Kind::String).check(validators::DNS1123_SUBDOMAIN),
            Field::optional("namespace", Kind::String).check(validators::DNS1123_LABEL),
        ],
    )
}

pub(crate) fn create_kubeconfig_secret_schema() -> Schema {
    Schema::new(
        "CreateKubeconfigSecretRequest",
        vec![
            Field::required("name", Kind::String).check(validators::DNS1123_SUBDOMAIN),
            Field::required("kubeconfig", Kind::String).check(validators::KUBECONFIG),
        ],
    )
}

pub(crate) fn delete_kubeconfig_secret_schema() -> Schema {
    Schema::new(
        "DeleteKubeconfigSecretRequest",
        vec![
            Field::required("name", Kind::String).check(validators::DNS1123_SUBDOMAIN),
            Field::optional("namespace", Kind::String).check(validators::DNS1123_LABEL),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_core::{CoreError, Document, validate, validate_into};
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        Document::from_json_slice(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_create_minimal_in_cluster() {
        let document = doc(json!({
            "name": "dev-cluster",
            "connection": {"type": "in-cluster"}
        }));

        let request: CreateWorkspaceRequest =
            validate_into(&document, &create_workspace_schema()).unwrap();
        assert_eq!(request.name, "dev-cluster");
        assert_eq!(
            request.connection.connection_type,
            WorkspaceConnectionType::InCluster
        );
        assert!(request.workspace_type.is_none());
    }

    #[test]
    fn test_kubeconfig_connection_requires_secret() {
        let document = doc(json!({
            "name": "dev-cluster",
            "connection": {"type": "kubeconfig"}
        }));

        let err = validate(&document, &create_workspace_schema()).unwrap_err();
        let CoreError::Violations { report, .. } = err else {
            panic!("expected violations");
        };
        assert!(report.contains("CreateWorkspaceRequest.connection", "secret_required"));

        let document = doc(json!({
            "name": "dev-cluster",
            "connection": {
                "type": "kubeconfig",
                "secret": {"name": "dev-kubeconfig", "namespace": "default"}
            }
        }));
        assert!(validate(&document, &create_workspace_schema()).is_ok());
    }

    #[test]
    fn test_auto_hibernation_schedules() {
        let document = doc(json!({
            "name": "dev-cluster",
            "connection": {"type": "in-cluster"},
            "autoHibernation": {
                "enabled": true,
                "schedule": "0 22 * * *",
                "wakeSchedule": "not a schedule"
            }
        }));

        let err = validate(&document, &create_workspace_schema()).unwrap_err();
        let CoreError::Violations { report, .. } = err else {
            panic!("expected violations");
        };
        assert!(report.contains(
            "CreateWorkspaceRequest.autoHibernation.wakeSchedule",
            "cron_schedule"
        ));
    }

    #[test]
    fn test_update_distinguishes_clear_from_absent() {
        let document = doc(json!({
            "name": "dev-cluster",
            "autoHibernation": null
        }));

        let request: UpdateWorkspaceRequest =
            validate_into(&document, &update_workspace_schema()).unwrap();
        assert_eq!(request.hibernated, Patch::Absent);
        assert_eq!(request.auto_hibernation, Patch::Null);
    }

    #[test]
    fn test_kubeconfig_secret_request_roundtrip() {
        let kubeconfig = r#"
clusters:
  - name: dev
contexts:
  - name: dev-admin
users:
  - name: admin
"#;
        let document = Document::from_pairs([("name", "dev-cluster"), ("kubeconfig", kubeconfig)]);

        let request: CreateKubeconfigSecretRequest =
            validate_into(&document, &create_kubeconfig_secret_schema()).unwrap();
        assert_eq!(request.name, "dev-cluster");
        assert!(request.kubeconfig.contains("dev-admin"));
    }

    #[test]
    fn test_kubeconfig_secret_request_rejects_bad_bundle() {
        let document =
            Document::from_pairs([("name", "dev-cluster"), ("kubeconfig", "clusters: []")]);

        let err = validate(&document, &create_kubeconfig_secret_schema()).unwrap_err();
        let CoreError::Violations { report, .. } = err else {
            panic!("expected violations");
        };
        assert!(report.contains("CreateKubeconfigSecretRequest.kubeconfig", "kubeconfig"));
    }
}
