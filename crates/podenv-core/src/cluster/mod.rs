//! Kubernetes API access: client construction, pod listing, and fetching the
//! external configuration objects referenced by container `envFrom` entries.
//!
//! All calls are single-shot and fail-fast. A missing or unreadable object
//! aborts the whole invocation; nothing here retries or returns partial data.

mod errors;

use std::collections::BTreeMap;
use std::path::Path;

use k8s_openapi::api::core::v1::{ConfigMap, Pod, Secret};
use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::debug;

pub use errors::ClusterError;

/// Build a client from the kubeconfig file at `path`, honoring its
/// current context.
pub async fn build_client(path: &Path) -> Result<Client, ClusterError> {
    let kubeconfig =
        Kubeconfig::read_from(path).map_err(|source| ClusterError::KubeconfigLoadFailed {
            path: path.to_path_buf(),
            source,
        })?;

    let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|source| ClusterError::KubeconfigLoadFailed {
            path: path.to_path_buf(),
            source,
        })?;

    let client =
        Client::try_from(config).map_err(|source| ClusterError::ClientBuildFailed { source })?;

    debug!(event = "core.cluster.client_built", kubeconfig = %path.display());
    Ok(client)
}

/// List pods in `namespace` matching `selector`.
///
/// An empty result is returned as-is; the selection policy (fail on zero
/// matches) belongs to the resolution layer.
pub async fn list_pods(
    client: Client,
    namespace: &str,
    selector: &str,
) -> Result<Vec<Pod>, ClusterError> {
    let pods: Api<Pod> = Api::namespaced(client, namespace);
    let list = pods
        .list(&ListParams::default().labels(selector))
        .await
        .map_err(|source| ClusterError::PodListFailed {
            namespace: namespace.to_string(),
            source,
        })?;

    debug!(
        event = "core.cluster.pods_listed",
        namespace = namespace,
        selector = selector,
        count = list.items.len()
    );
    Ok(list.items)
}

/// Retrieval of named external configuration objects as flat key/value maps.
///
/// The resolution engine consumes this seam; tests substitute an in-memory
/// implementation so merge semantics can be exercised without a cluster.
#[allow(async_fn_in_trait)]
pub trait ConfigFetcher {
    /// Fetch a plain (non-sensitive) key/value map by name.
    async fn fetch_plain(&self, name: &str) -> Result<BTreeMap<String, String>, ClusterError>;

    /// Fetch a sensitive key/value map by name. Values are raw bytes;
    /// decoding is the caller's concern.
    async fn fetch_sensitive(
        &self,
        name: &str,
    ) -> Result<BTreeMap<String, Vec<u8>>, ClusterError>;
}

/// [`ConfigFetcher`] backed by the cluster API, scoped to one namespace.
pub struct KubeFetcher {
    configmaps: Api<ConfigMap>,
    secrets: Api<Secret>,
    namespace: String,
}

impl KubeFetcher {
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            configmaps: Api::namespaced(client.clone(), namespace),
            secrets: Api::namespaced(client, namespace),
            namespace: namespace.to_string(),
        }
    }
}

impl ConfigFetcher for KubeFetcher {
    async fn fetch_plain(&self, name: &str) -> Result<BTreeMap<String, String>, ClusterError> {
        let configmap =
            self.configmaps
                .get(name)
                .await
                .map_err(|source| ClusterError::ConfigMapFetchFailed {
                    name: name.to_string(),
                    namespace: self.namespace.clone(),
                    source,
                })?;

        let data = configmap.data.unwrap_or_default();
        debug!(
            event = "core.cluster.configmap_fetched",
            name = name,
            namespace = %self.namespace,
            entries = data.len()
        );
        Ok(data)
    }

    async fn fetch_sensitive(
        &self,
        name: &str,
    ) -> Result<BTreeMap<String, Vec<u8>>, ClusterError> {
        let secret =
            self.secrets
                .get(name)
                .await
                .map_err(|source| ClusterError::SecretFetchFailed {
                    name: name.to_string(),
                    namespace: self.namespace.clone(),
                    source,
                })?;

        let data: BTreeMap<String, Vec<u8>> = secret
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|(key, bytes)| (key, bytes.0))
            .collect();

        debug!(
            event = "core.cluster.secret_fetched",
            name = name,
            namespace = %self.namespace,
            entries = data.len()
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_client_missing_kubeconfig_fails() {
        let result = build_client(Path::new("/nonexistent/kubeconfig")).await;
        match result {
            Err(ClusterError::KubeconfigLoadFailed { path, .. }) => {
                assert_eq!(path, Path::new("/nonexistent/kubeconfig"));
            }
            Err(other) => panic!("expected KubeconfigLoadFailed, got {other:?}"),
            Ok(_) => panic!("expected KubeconfigLoadFailed, got a client"),
        }
    }

    #[test]
    fn test_error_messages_name_the_object() {
        let err = ClusterError::ConfigMapFetchFailed {
            name: "app-config".to_string(),
            namespace: "staging".to_string(),
            source: kube::Error::Api(kube::core::ErrorResponse {
                status: "Failure".to_string(),
                message: "configmaps \"app-config\" not found".to_string(),
                reason: "NotFound".to_string(),
                code: 404,
            }),
        };
        let msg = err.to_string();
        assert!(msg.contains("app-config"));
        assert!(msg.contains("staging"));
    }
}
