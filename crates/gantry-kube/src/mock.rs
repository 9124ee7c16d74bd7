//! Mock control plane for testing
//!
//! Stores objects in memory, so the API layer can be exercised without a
//! cluster. Continuation tokens are stringified offsets: opaque to callers,
//! meaningful only to this store, exactly like the real control plane's
//! tokens are meaningful only to it.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;

use crate::client::{ControlPlane, Mutate, ObjectKey, Page, PageRequest};
use crate::error::{KubeError, Result};
use crate::resources::{Module, Workspace};

/// Build a 409 API error, the same shape the cluster would return.
pub(crate) fn conflict_error(message: &str) -> KubeError {
    KubeError::Api(kube::Error::Api(kube::core::ErrorResponse {
        status: "Failure".to_string(),
        message: message.to_string(),
        reason: "Conflict".to_string(),
        code: 409,
    }))
}

fn already_exists(kind: &str, name: &str) -> KubeError {
    KubeError::Api(kube::Error::Api(kube::core::ErrorResponse {
        status: "Failure".to_string(),
        message: format!("{kind} \"{name}\" already exists"),
        reason: "AlreadyExists".to_string(),
        code: 409,
    }))
}

type Store<K> = Arc<RwLock<BTreeMap<(String, String), K>>>;

/// Counts of operations performed, for test assertions.
#[derive(Debug, Default, Clone)]
pub struct OperationCounts {
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
    pub lists: usize,
}

/// In-memory control plane.
#[derive(Clone, Default)]
pub struct MockControlPlane {
    workspaces: Store<Workspace>,
    modules: Store<Module>,
    secrets: Store<Secret>,
    operations: Arc<RwLock<OperationCounts>>,
    /// Number of upcoming updates that fail with a conflict before applying.
    conflicts_remaining: Arc<RwLock<usize>>,
}

impl MockControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` update attempts with a write conflict.
    pub fn inject_conflicts(&self, count: usize) {
        *self.conflicts_remaining.write().expect("lock poisoned") = count;
    }

    /// Operation counts for assertions.
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations.read().expect("lock poisoned").clone()
    }

    pub fn workspace_count(&self) -> usize {
        self.workspaces.read().expect("lock poisoned").len()
    }

    pub fn module_count(&self) -> usize {
        self.modules.read().expect("lock poisoned").len()
    }

    pub fn secret_count(&self) -> usize {
        self.secrets.read().expect("lock poisoned").len()
    }

    /// Fetch a stored workspace for assertions.
    pub fn workspace(&self, key: &ObjectKey) -> Option<Workspace> {
        self.workspaces
            .read()
            .expect("lock poisoned")
            .get(&store_key(key))
            .cloned()
    }

    /// Fetch a stored module for assertions.
    pub fn module(&self, key: &ObjectKey) -> Option<Module> {
        self.modules
            .read()
            .expect("lock poisoned")
            .get(&store_key(key))
            .cloned()
    }

    fn count(&self, bump: impl FnOnce(&mut OperationCounts)) {
        bump(&mut self.operations.write().expect("lock poisoned"));
    }

    fn take_conflict(&self) -> bool {
        let mut remaining = self.conflicts_remaining.write().expect("lock poisoned");
        if *remaining > 0 {
            *remaining -= 1;
            true
        } else {
            false
        }
    }
}

fn store_key(key: &ObjectKey) -> (String, String) {
    (key.namespace.clone(), key.name.clone())
}

fn meta_key<K: kube::Resource>(kind: &'static str, object: &K) -> Result<(String, String)> {
    let meta = object.meta();
    let name = meta.name.clone().ok_or_else(|| KubeError::NotFound {
        kind,
        name: String::new(),
        namespace: String::new(),
    })?;
    let namespace = meta.namespace.clone().unwrap_or_else(|| "default".to_string());
    Ok((namespace, name))
}

fn create_in<K>(store: &Store<K>, kind: &'static str, object: K) -> Result<K>
where
    K: kube::Resource + Clone,
{
    let key = meta_key(kind, &object)?;
    let mut map = store.write().expect("lock poisoned");
    if map.contains_key(&key) {
        return Err(already_exists(kind, &key.1));
    }
    map.insert(key, object.clone());
    Ok(object)
}

fn update_in<K: Clone>(
    store: &Store<K>,
    kind: &'static str,
    key: &ObjectKey,
    mutate: Mutate<'_, K>,
) -> Result<K> {
    let mut map = store.write().expect("lock poisoned");
    let entry = map.get_mut(&store_key(key)).ok_or(KubeError::NotFound {
        kind,
        name: key.name.clone(),
        namespace: key.namespace.clone(),
    })?;
    mutate(entry);
    Ok(entry.clone())
}

fn delete_in<K>(store: &Store<K>, kind: &'static str, key: &ObjectKey) -> Result<()> {
    let mut map = store.write().expect("lock poisoned");
    map.remove(&store_key(key)).ok_or(KubeError::NotFound {
        kind,
        name: key.name.clone(),
        namespace: key.namespace.clone(),
    })?;
    Ok(())
}

fn page_of<K: Clone>(store: &Store<K>, page: &PageRequest) -> Page<K> {
    let map = store.read().expect("lock poisoned");
    let start = page
        .continue_token
        .as_deref()
        .and_then(|t| t.parse::<usize>().ok())
        .unwrap_or(0);
    let limit = page.limit.max(0) as usize;

    let items: Vec<K> = map.values().skip(start).take(limit).cloned().collect();
    let next = start + items.len();
    let continue_token = (next < map.len()).then(|| next.to_string());

    Page {
        items,
        continue_token,
    }
}

#[async_trait]
impl ControlPlane for MockControlPlane {
    async fn create_workspace(&self, workspace: Workspace) -> Result<Workspace> {
        self.count(|c| c.creates += 1);
        create_in(&self.workspaces, "Workspace", workspace)
    }

    async fn update_workspace(
        &self,
        key: &ObjectKey,
        mutate: Mutate<'_, Workspace>,
    ) -> Result<Workspace> {
        self.count(|c| c.updates += 1);
        if self.take_conflict() {
            return Err(conflict_error("the object has been modified"));
        }
        update_in(&self.workspaces, "Workspace", key, mutate)
    }

    async fn delete_workspace(&self, key: &ObjectKey) -> Result<()> {
        self.count(|c| c.deletes += 1);
        delete_in(&self.workspaces, "Workspace", key)
    }

    async fn list_workspaces(&self, page: &PageRequest) -> Result<Page<Workspace>> {
        self.count(|c| c.lists += 1);
        Ok(page_of(&self.workspaces, page))
    }

    async fn create_module(&self, module: Module) -> Result<Module> {
        self.count(|c| c.creates += 1);
        create_in(&self.modules, "Module", module)
    }

    async fn update_module(&self, key: &ObjectKey, mutate: Mutate<'_, Module>) -> Result<Module> {
        self.count(|c| c.updates += 1);
        if self.take_conflict() {
            return Err(conflict_error("the object has been modified"));
        }
        update_in(&self.modules, "Module", key, mutate)
    }

    async fn delete_module(&self, key: &ObjectKey) -> Result<()> {
        self.count(|c| c.deletes += 1);
        delete_in(&self.modules, "Module", key)
    }

    async fn list_modules(&self, page: &PageRequest) -> Result<Page<Module>> {
        self.count(|c| c.lists += 1);
        Ok(page_of(&self.modules, page))
    }

    async fn create_kubeconfig_secret(&self, mut secret: Secret) -> Result<Secret> {
        self.count(|c| c.creates += 1);
        // The real API server assigns the uid.
        if secret.metadata.uid.is_none() {
            let name = secret.metadata.name.clone().unwrap_or_default();
            secret.metadata.uid = Some(format!("{name}-uid"));
        }
        create_in(&self.secrets, "Secret", secret)
    }

    async fn delete_kubeconfig_secret(&self, key: &ObjectKey) -> Result<()> {
        self.count(|c| c.deletes += 1);
        delete_in(&self.secrets, "Secret", key)
    }

    async fn list_kubeconfig_secrets(&self, page: &PageRequest) -> Result<Page<Secret>> {
        self.count(|c| c.lists += 1);
        Ok(page_of(&self.secrets, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{WorkspaceConnection, WorkspaceConnectionType, WorkspaceSpec};

    fn workspace(name: &str) -> Workspace {
        let mut workspace = Workspace::new(
            name,
            WorkspaceSpec {
                workspace_type: Default::default(),
                from: None,
                hibernated: Some(false),
                connection: WorkspaceConnection {
                    connection_type: WorkspaceConnectionType::InCluster,
                    secret_reference: None,
                },
                auto_hibernation: None,
            },
        );
        workspace.metadata.namespace = Some("default".to_string());
        workspace
    }

    #[tokio::test]
    async fn test_create_and_duplicate() {
        let mock = MockControlPlane::new();

        mock.create_workspace(workspace("dev")).await.unwrap();
        let err = mock.create_workspace(workspace("dev")).await.unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(mock.workspace_count(), 1);
    }

    #[tokio::test]
    async fn test_pagination_walks_the_store() {
        let mock = MockControlPlane::new();
        for i in 0..5 {
            mock.create_workspace(workspace(&format!("ws-{i}")))
                .await
                .unwrap();
        }

        let first = mock
            .list_workspaces(&PageRequest {
                limit: 2,
                continue_token: None,
            })
            .await
            .unwrap();
        assert_eq!(first.items.len(), 2);
        let token = first.continue_token.clone().unwrap();

        // Resubmitting the returned token yields the next page.
        let second = mock
            .list_workspaces(&PageRequest {
                limit: 2,
                continue_token: Some(token),
            })
            .await
            .unwrap();
        assert_eq!(second.items.len(), 2);
        assert_ne!(
            first.items[0].metadata.name,
            second.items[0].metadata.name
        );

        let third = mock
            .list_workspaces(&PageRequest {
                limit: 2,
                continue_token: second.continue_token.clone(),
            })
            .await
            .unwrap();
        assert_eq!(third.items.len(), 1);
        assert!(third.continue_token.is_none());
    }

    #[tokio::test]
    async fn test_update_mutates_in_place() {
        let mock = MockControlPlane::new();
        mock.create_workspace(workspace("dev")).await.unwrap();

        let key = ObjectKey::new("dev", "default");
        let updated = mock
            .update_workspace(&key, &|ws| ws.spec.hibernated = Some(true))
            .await
            .unwrap();

        assert_eq!(updated.spec.hibernated, Some(true));
        assert_eq!(mock.operation_counts().updates, 1);
    }

    #[tokio::test]
    async fn test_injected_conflicts() {
        let mock = MockControlPlane::new();
        mock.create_workspace(workspace("dev")).await.unwrap();
        mock.inject_conflicts(1);

        let key = ObjectKey::new("dev", "default");
        let err = mock.update_workspace(&key, &|_| {}).await.unwrap_err();
        assert!(err.is_conflict());

        // Next attempt goes through.
        assert!(mock.update_workspace(&key, &|_| {}).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let mock = MockControlPlane::new();
        let key = ObjectKey::new("ghost", "default");

        let err = mock.delete_workspace(&key).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
