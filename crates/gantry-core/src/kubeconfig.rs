//! Structural model of a cluster credential bundle (kubeconfig)
//!
//! Only the shape needed to judge validity is modelled; cluster endpoints,
//! auth payloads and extensions stay opaque YAML.

use serde::Deserialize;

/// Minimal kubeconfig document.
#[derive(Debug, Clone, Deserialize)]
pub struct Kubeconfig {
    #[serde(default)]
    pub clusters: Vec<NamedCluster>,
    #[serde(default)]
    pub contexts: Vec<NamedContext>,
    #[serde(default)]
    pub users: Vec<NamedUser>,
    #[serde(default, rename = "current-context")]
    pub current_context: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    #[serde(default)]
    pub cluster: serde_yaml::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedContext {
    pub name: String,
    #[serde(default)]
    pub context: serde_yaml::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedUser {
    pub name: String,
    #[serde(default)]
    pub user: serde_yaml::Value,
}

impl Kubeconfig {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Structural validity: at least one cluster, one context and one user;
    /// a named current context must exist among the declared contexts.
    pub fn has_required_entries(&self) -> bool {
        if self.clusters.is_empty() || self.contexts.is_empty() || self.users.is_empty() {
            return false;
        }

        match self.current_context.as_deref() {
            Some(name) if !name.is_empty() => self.contexts.iter().any(|c| c.name == name),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
apiVersion: v1
kind: Config
clusters:
  - name: dev
    cluster:
      server: https://10.0.0.1:6443
contexts:
  - name: dev-admin
    context:
      cluster: dev
      user: admin
users:
  - name: admin
    user:
      token: secret
current-context: dev-admin
"#;

    #[test]
    fn test_valid_bundle() {
        let config = Kubeconfig::from_yaml(VALID).unwrap();
        assert!(config.has_required_entries());
    }

    #[test]
    fn test_dangling_current_context() {
        let text = VALID.replace("current-context: dev-admin", "current-context: staging");
        let config = Kubeconfig::from_yaml(&text).unwrap();
        assert!(!config.has_required_entries());
    }

    #[test]
    fn test_missing_users_section() {
        let text = r#"
clusters:
  - name: dev
contexts:
  - name: dev-admin
"#;
        let config = Kubeconfig::from_yaml(text).unwrap();
        assert!(!config.has_required_entries());
    }

    #[test]
    fn test_no_current_context_is_fine() {
        let text = VALID.replace("current-context: dev-admin", "");
        let config = Kubeconfig::from_yaml(&text).unwrap();
        assert!(config.has_required_entries());
    }
}
