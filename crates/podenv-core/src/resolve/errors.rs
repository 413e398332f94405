use crate::cluster::ClusterError;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Could not find any pods matching the selector '{selector}' in '{namespace}'")]
    NoMatchingPods { selector: String, namespace: String },

    #[error("Cluster operation failed: {source}")]
    Cluster {
        #[from]
        source: ClusterError,
    },
}
