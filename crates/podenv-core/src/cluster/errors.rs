use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("Failed to load kubeconfig from '{path}': {source}")]
    KubeconfigLoadFailed {
        path: PathBuf,
        #[source]
        source: kube::config::KubeconfigError,
    },

    #[error("Failed to build cluster client: {source}")]
    ClientBuildFailed {
        #[source]
        source: kube::Error,
    },

    #[error("Failed to list pods in namespace '{namespace}': {source}")]
    PodListFailed {
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("Failed to fetch ConfigMap '{name}' in namespace '{namespace}': {source}")]
    ConfigMapFetchFailed {
        name: String,
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("Failed to fetch Secret '{name}' in namespace '{namespace}': {source}")]
    SecretFetchFailed {
        name: String,
        namespace: String,
        #[source]
        source: kube::Error,
    },
}
