//! Control-plane client
//!
//! The API layer talks to the cluster through the `ControlPlane` trait:
//! submit a spec, get back the stored object or an error; fetch a page of
//! objects given a limit and an opaque continuation token. The kube-backed
//! implementation lives here; an in-memory mock for tests lives in `mock`.
//!
//! Callers attach cancellation by dropping the future or racing it against
//! a deadline; nothing in here holds state across calls.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{KubeError, Result};
use crate::resources::{Module, Workspace};

/// Label key marking secrets owned by this API.
pub const ROLE_LABEL: &str = "gantry.dev/role";

/// Role value for workspace kubeconfig secrets.
pub const KUBECONFIG_ROLE: &str = "workspace-kubeconfig";

/// Bounded retry for update conflicts: attempts and starting backoff.
const UPDATE_ATTEMPTS: usize = 5;
const UPDATE_BACKOFF: Duration = Duration::from_millis(100);

/// (name, namespace) identifying one stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectKey {
    pub name: String,
    pub namespace: String,
}

impl ObjectKey {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

/// Page-size limit plus the opaque continuation token.
///
/// The token is never interpreted here: it is forwarded verbatim to the list
/// call and whatever comes back is reflected to the caller unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub continue_token: Option<String>,
}

/// One page of stored objects plus the token for the next page, if any.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub continue_token: Option<String>,
}

/// Mutator applied inside the read-modify-write sequence of an update.
pub type Mutate<'a, K> = &'a (dyn Fn(&mut K) + Send + Sync);

/// Everything the API layer may ask of the cluster.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    async fn create_workspace(&self, workspace: Workspace) -> Result<Workspace>;
    async fn update_workspace(
        &self,
        key: &ObjectKey,
        mutate: Mutate<'_, Workspace>,
    ) -> Result<Workspace>;
    async fn delete_workspace(&self, key: &ObjectKey) -> Result<()>;
    async fn list_workspaces(&self, page: &PageRequest) -> Result<Page<Workspace>>;

    async fn create_module(&self, module: Module) -> Result<Module>;
    async fn update_module(&self, key: &ObjectKey, mutate: Mutate<'_, Module>) -> Result<Module>;
    async fn delete_module(&self, key: &ObjectKey) -> Result<()>;
    async fn list_modules(&self, page: &PageRequest) -> Result<Page<Module>>;

    async fn create_kubeconfig_secret(&self, secret: Secret) -> Result<Secret>;
    async fn delete_kubeconfig_secret(&self, key: &ObjectKey) -> Result<()>;
    async fn list_kubeconfig_secrets(&self, page: &PageRequest) -> Result<Page<Secret>>;
}

/// Retry an operation while it fails with a write conflict.
///
/// Scoped strictly to one read-modify-write sequence: the caller's closure
/// re-reads on every attempt. Anything other than a conflict propagates
/// immediately; the last conflict is returned once attempts run out.
pub async fn with_conflict_retry<T, F, Fut>(
    attempts: usize,
    backoff: Duration,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut delay = backoff;
    let mut remaining = attempts.max(1);

    loop {
        remaining -= 1;
        match operation().await {
            Err(e) if e.is_conflict() && remaining > 0 => {
                tracing::debug!(delay_ms = delay.as_millis() as u64, "write conflict, retrying");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            other => return other,
        }
    }
}

/// Kubernetes-backed control plane.
#[derive(Clone)]
pub struct KubeControlPlane {
    client: kube::Client,
}

impl KubeControlPlane {
    /// Connect using the ambient cluster configuration.
    pub async fn new() -> Result<Self> {
        Ok(Self {
            client: kube::Client::try_default().await?,
        })
    }

    /// Wrap an existing Kubernetes client.
    pub fn with_client(client: kube::Client) -> Self {
        Self { client }
    }

    fn workspaces(&self, namespace: &str) -> Api<Workspace> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn modules(&self, namespace: &str) -> Api<Module> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn secrets(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ControlPlane for KubeControlPlane {
    async fn create_workspace(&self, workspace: Workspace) -> Result<Workspace> {
        let api = self.workspaces(&namespace_of(&workspace));
        Ok(api.create(&PostParams::default(), &workspace).await?)
    }

    async fn update_workspace(
        &self,
        key: &ObjectKey,
        mutate: Mutate<'_, Workspace>,
    ) -> Result<Workspace> {
        update_object(self.workspaces(&key.namespace), "Workspace", key, mutate).await
    }

    async fn delete_workspace(&self, key: &ObjectKey) -> Result<()> {
        delete_object(self.workspaces(&key.namespace), "Workspace", key).await
    }

    async fn list_workspaces(&self, page: &PageRequest) -> Result<Page<Workspace>> {
        list_objects(Api::all(self.client.clone()), page, None).await
    }

    async fn create_module(&self, module: Module) -> Result<Module> {
        let api = self.modules(&namespace_of(&module));
        Ok(api.create(&PostParams::default(), &module).await?)
    }

    async fn update_module(&self, key: &ObjectKey, mutate: Mutate<'_, Module>) -> Result<Module> {
        update_object(self.modules(&key.namespace), "Module", key, mutate).await
    }

    async fn delete_module(&self, key: &ObjectKey) -> Result<()> {
        delete_object(self.modules(&key.namespace), "Module", key).await
    }

    async fn list_modules(&self, page: &PageRequest) -> Result<Page<Module>> {
        list_objects(Api::all(self.client.clone()), page, None).await
    }

    async fn create_kubeconfig_secret(&self, secret: Secret) -> Result<Secret> {
        let api = self.secrets(&namespace_of(&secret));
        Ok(api.create(&PostParams::default(), &secret).await?)
    }

    async fn delete_kubeconfig_secret(&self, key: &ObjectKey) -> Result<()> {
        delete_object(self.secrets(&key.namespace), "Secret", key).await
    }

    async fn list_kubeconfig_secrets(&self, page: &PageRequest) -> Result<Page<Secret>> {
        let selector = format!("{ROLE_LABEL}={KUBECONFIG_ROLE}");
        list_objects(Api::all(self.client.clone()), page, Some(&selector)).await
    }
}

fn namespace_of<K: kube::Resource>(object: &K) -> String {
    object
        .meta()
        .namespace
        .clone()
        .unwrap_or_else(|| "default".to_string())
}

fn not_found(kind: &'static str, key: &ObjectKey) -> KubeError {
    KubeError::NotFound {
        kind,
        name: key.name.clone(),
        namespace: key.namespace.clone(),
    }
}

async fn update_object<K>(
    api: Api<K>,
    kind: &'static str,
    key: &ObjectKey,
    mutate: Mutate<'_, K>,
) -> Result<K>
where
    K: Clone + DeserializeOwned + Serialize + std::fmt::Debug,
{
    with_conflict_retry(UPDATE_ATTEMPTS, UPDATE_BACKOFF, || {
        let api = api.clone();
        async move {
            let mut current = match api.get(&key.name).await {
                Ok(object) => object,
                Err(kube::Error::Api(resp)) if resp.code == 404 => {
                    return Err(not_found(kind, key));
                }
                Err(e) => return Err(e.into()),
            };
            mutate(&mut current);
            Ok(api
                .replace(&key.name, &PostParams::default(), &current)
                .await?)
        }
    })
    .await
}

async fn delete_object<K>(api: Api<K>, kind: &'static str, key: &ObjectKey) -> Result<()>
where
    K: Clone + DeserializeOwned + std::fmt::Debug,
{
    match api.delete(&key.name, &DeleteParams::default()).await {
        Ok(_) => Ok(()),
        Err(kube::Error::Api(resp)) if resp.code == 404 => Err(not_found(kind, key)),
        Err(e) => Err(e.into()),
    }
}

async fn list_objects<K>(
    api: Api<K>,
    page: &PageRequest,
    label_selector: Option<&str>,
) -> Result<Page<K>>
where
    K: Clone + DeserializeOwned + std::fmt::Debug,
{
    let mut params = ListParams::default().limit(page.limit.max(0) as u32);
    if let Some(token) = page.continue_token.as_deref() {
        params = params.continue_token(token);
    }
    if let Some(selector) = label_selector {
        params = params.labels(selector);
    }

    let list = api.list(&params).await?;
    Ok(Page {
        continue_token: list.metadata.continue_.filter(|t| !t.is_empty()),
        items: list.items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::conflict_error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_conflict_retry_succeeds_after_conflicts() {
        let calls = AtomicUsize::new(0);

        let result = with_conflict_retry(5, Duration::from_millis(1), || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(conflict_error("try again"))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_conflict_retry_gives_up_after_attempts() {
        let calls = AtomicUsize::new(0);

        let result: Result<()> = with_conflict_retry(3, Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(conflict_error("still conflicting")) }
        })
        .await;

        assert!(result.unwrap_err().is_conflict());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_conflict_errors_propagate_immediately() {
        let calls = AtomicUsize::new(0);

        let result: Result<()> = with_conflict_retry(5, Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(KubeError::NotFound {
                    kind: "Workspace",
                    name: "dev".into(),
                    namespace: "default".into(),
                })
            }
        })
        .await;

        assert!(result.unwrap_err().is_not_found());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
