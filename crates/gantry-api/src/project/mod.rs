//! Projection from validated DTOs into control-plane resource specs
//!
//! Pure and deterministic: the same validated request always projects to the
//! byte-identical spec. The only defaults applied here are the documented
//! fallbacks (namespace -> "default", workspace type -> kubernetes).
//! Unselected union branches never appear in the output graph.

mod module;
mod workspace;

pub use module::{
    ModuleListItem, apply_module_update, module, module_list_item, module_type_label,
};
pub use workspace::{
    KubeconfigSecretListItem, WorkspaceListItem, apply_workspace_update, kubeconfig_secret,
    kubeconfig_secret_list_item, workspace, workspace_list_item,
};

use gantry_kube::ResourceReference;

use crate::requests::ReferenceDto;

/// Fallback namespace for requests that name none.
pub const DEFAULT_NAMESPACE: &str = "default";

pub(crate) fn namespace_or_default(namespace: &Option<String>) -> String {
    namespace
        .clone()
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())
}

pub(crate) fn reference(dto: &ReferenceDto) -> ResourceReference {
    ResourceReference {
        name: dto.name.clone(),
        namespace: dto.namespace.clone(),
    }
}
