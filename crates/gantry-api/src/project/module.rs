//! Module projections
//!
//! The interesting rule here is re-encoding: inline manifests arrive as YAML
//! text and literal values as JSON maps, and both leave as JSON values, the
//! canonical wire form. Each union branch converts independently; only the
//! selected branch produces a sub-object.

use gantry_core::Patch;
use gantry_kube::{
    ChartGit, ChartRepository, ChartSource, ConfigMapSource, ExistingHelmRelease, HelmOutput,
    HelmValueSource, Module, ModuleSource, ModuleSpec, SecretKeySelector,
};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::requests::{
    ChartSourceDto, ConfigMapRefDto, CreateModuleRequest, ExistingHelmReleaseDto, ModuleSourceDto,
    OutputDto, ReferenceDto, SecretKeyRefDto, UpdateModuleRequest, ValueSourceDto,
};

use super::{namespace_or_default, reference};

/// Project a create request into a Module resource.
///
/// The YAML re-encode cannot fail on documents that passed validation; the
/// error path exists for the type system, not for clients.
pub fn module(request: &CreateModuleRequest) -> Result<Module, serde_yaml::Error> {
    let mut module = Module::new(
        &request.name,
        ModuleSpec {
            workspace: reference(&request.workspace),
            source: module_source(&request.source)?,
            config: request.config.as_ref().map(|m| JsonValue::Object(m.clone())),
            hibernated: request.hibernated,
        },
    );
    module.metadata.namespace = Some(namespace_or_default(&request.namespace));
    Ok(module)
}

fn module_source(dto: &ModuleSourceDto) -> Result<ModuleSource, serde_yaml::Error> {
    Ok(ModuleSource {
        raw: dto
            .raw
            .as_deref()
            .map(serde_yaml::from_str::<JsonValue>)
            .transpose()?,
        http_url: dto.http_url.clone(),
        config_map: dto.config_map.as_ref().map(config_map),
        existing_helm_release: dto.existing_helm_release.as_ref().map(existing_helm_release),
    })
}

fn config_map(dto: &ConfigMapRefDto) -> ConfigMapSource {
    ConfigMapSource {
        name: dto.name.clone(),
        namespace: dto.namespace.clone(),
        key: dto.key.clone(),
    }
}

fn existing_helm_release(dto: &ExistingHelmReleaseDto) -> ExistingHelmRelease {
    ExistingHelmRelease {
        name: dto.name.clone(),
        namespace: dto.namespace.clone(),
        chart_source: chart_source(&dto.chart_source),
        values: dto.values.iter().map(value_source).collect(),
        outputs: dto.outputs.iter().map(output).collect(),
    }
}

fn chart_source(dto: &ChartSourceDto) -> ChartSource {
    ChartSource {
        repository: dto.repository.as_ref().map(|r| ChartRepository {
            url: r.url.clone(),
            chart: r.chart.clone(),
            version: r.version.clone(),
        }),
        config_map: dto.config_map.as_ref().map(config_map),
        git: dto.git.as_ref().map(|g| ChartGit {
            repo: g.repo.clone(),
            path: g.path.clone(),
            revision: g.revision.clone(),
        }),
    }
}

fn value_source(dto: &ValueSourceDto) -> HelmValueSource {
    HelmValueSource {
        raw: dto.raw.clone().map(JsonValue::Object),
        secret_ref: dto.secret_ref.as_ref().map(secret_key_ref),
    }
}

fn output(dto: &OutputDto) -> HelmOutput {
    HelmOutput {
        name: dto.name.clone(),
        value: dto.value.clone(),
        secret_key_ref: dto.secret_key_ref.as_ref().map(secret_key_ref),
    }
}

fn secret_key_ref(dto: &SecretKeyRefDto) -> SecretKeySelector {
    SecretKeySelector {
        name: dto.name.clone(),
        namespace: dto.namespace.clone(),
        key: dto.key.clone(),
    }
}

/// Apply an update request onto the stored module.
pub fn apply_module_update(request: &UpdateModuleRequest, module: &mut Module) {
    match request.hibernated {
        Patch::Absent => {}
        // Hibernation on a module is a plain flag; clearing means "not
        // hibernated".
        Patch::Null => module.spec.hibernated = false,
        Patch::Value(value) => module.spec.hibernated = value,
    }
}

/// Response item for module listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleListItem {
    pub name: String,
    pub namespace: String,
    pub phase: String,
    pub message: String,
    pub hibernated: bool,
    #[serde(rename = "type")]
    pub type_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<ReferenceDto>,
}

pub fn module_list_item(module: &Module) -> ModuleListItem {
    let status = module.status.clone().unwrap_or_default();

    ModuleListItem {
        name: module.metadata.name.clone().unwrap_or_default(),
        namespace: module.metadata.namespace.clone().unwrap_or_default(),
        phase: status.phase,
        message: status.message.unwrap_or_default(),
        hibernated: module.spec.hibernated,
        type_label: module_type_label(&module.spec.source),
        workspace: Some(ReferenceDto {
            name: module.spec.workspace.name.clone(),
            namespace: module.spec.workspace.namespace.clone(),
        }),
    }
}

/// Display label derived from the source. Reading `kind` out of the stored
/// manifest never fails the listing; anything unreadable is "Unknown".
pub fn module_type_label(source: &ModuleSource) -> String {
    if let Some(raw) = &source.raw {
        return raw
            .get("kind")
            .and_then(|kind| kind.as_str())
            .unwrap_or("Unknown")
            .to_string();
    }
    if source.http_url.is_some() {
        return "Remote".to_string();
    }
    if source.existing_helm_release.is_some() {
        return "Helm".to_string();
    }
    "Unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_request(yaml: &str) -> CreateModuleRequest {
        CreateModuleRequest {
            name: "redis".to_string(),
            namespace: None,
            workspace: ReferenceDto {
                name: "dev-cluster".to_string(),
                namespace: "default".to_string(),
            },
            source: ModuleSourceDto {
                raw: Some(yaml.to_string()),
                ..ModuleSourceDto::default()
            },
            config: None,
            hibernated: false,
        }
    }

    #[test]
    fn test_yaml_manifest_reencoded_to_json() {
        let projected = module(&raw_request("kind: Helm\nspec:\n  chart: redis\n")).unwrap();

        assert_eq!(
            projected.spec.source.raw,
            Some(json!({"kind": "Helm", "spec": {"chart": "redis"}}))
        );
    }

    #[test]
    fn test_projection_is_deterministic() {
        let request = raw_request("kind: Helm\nspec:\n  replicas: 3\n");

        let first = serde_json::to_vec(&module(&request).unwrap()).unwrap();
        let second = serde_json::to_vec(&module(&request).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unselected_branches_are_omitted_from_wire_form() {
        let projected = module(&raw_request("kind: Helm")).unwrap();
        let wire = serde_json::to_value(&projected).unwrap();

        let source = &wire["spec"]["source"];
        assert!(source.get("raw").is_some());
        // Omitted, not null.
        assert!(source.get("httpURL").is_none());
        assert!(source.get("configMap").is_none());
        assert!(source.get("existingHelmRelease").is_none());
    }

    #[test]
    fn test_values_map_round_trips_through_wire_form() {
        let values = json!({"replicas": 3, "image": {"tag": "7.2"}});
        let mut request = raw_request("kind: Helm");
        request.config = Some(values.as_object().unwrap().clone());

        let projected = module(&request).unwrap();
        let bytes = serde_json::to_vec(&projected.spec.config).unwrap();
        let decoded: JsonValue = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_type_label_from_manifest_kind() {
        let projected = module(&raw_request("kind: Custom\nname: thing")).unwrap();
        assert_eq!(module_type_label(&projected.spec.source), "Custom");
    }

    #[test]
    fn test_type_label_falls_back_to_unknown() {
        // A manifest without a kind key must not fail the listing.
        let projected = module(&raw_request("name: no-kind-here")).unwrap();
        assert_eq!(module_type_label(&projected.spec.source), "Unknown");

        let remote = ModuleSource {
            http_url: Some("https://modules.example.com/redis.yaml".to_string()),
            ..ModuleSource::default()
        };
        assert_eq!(module_type_label(&remote), "Remote");

        assert_eq!(module_type_label(&ModuleSource::default()), "Unknown");
    }

    #[test]
    fn test_list_item_carries_workspace_reference() {
        let projected = module(&raw_request("kind: Helm")).unwrap();
        let item = module_list_item(&projected);

        assert_eq!(item.namespace, "default");
        assert_eq!(
            item.workspace,
            Some(ReferenceDto {
                name: "dev-cluster".to_string(),
                namespace: "default".to_string(),
            })
        );
        assert_eq!(item.phase, "");
    }
}
