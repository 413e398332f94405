//! Environment resolution engine.
//!
//! Builds one [`EnvSet`] approximating "what environment would this container
//! see" from declared pod specification data. Merging is strictly sequential
//! so precedence is simply "later write wins":
//!
//! 1. Host defaults (`TERM`, `LANG`), seeded once per run.
//! 2. Per container, each `envFrom` entry in list order (plain ConfigMap
//!    reference first, then Secret reference within one entry).
//! 3. Per container, the inline `env` declarations in declaration order.
//!
//! Across containers the last-processed container wins on name collision.
//! That is a deliberate coarse approximation of the real per-container
//! isolation, so collisions are logged rather than silently absorbed.
//!
//! Any fetch failure aborts the whole resolution. A shell opened over a
//! partially merged environment would look successful while being wrong.

mod errors;

use std::collections::HashMap;

use k8s_openapi::api::core::v1::{Container, Pod};
use tracing::{debug, info, warn};

use crate::cluster::ConfigFetcher;
use crate::env::EnvSet;

pub use errors::ResolveError;

/// Resolve the merged environment for the selected pods.
///
/// Fails before any fetch when the selection matched nothing; fails on the
/// first unfetchable external reference otherwise.
pub async fn resolve_environment<F: ConfigFetcher>(
    pods: &[Pod],
    fetcher: &F,
    selector: &str,
    namespace: &str,
) -> Result<EnvSet, ResolveError> {
    if pods.is_empty() {
        return Err(ResolveError::NoMatchingPods {
            selector: selector.to_string(),
            namespace: namespace.to_string(),
        });
    }

    let mut env = EnvSet::new();
    let mut origins: HashMap<String, String> = HashMap::new();

    for pod in pods {
        let pod_name = pod.metadata.name.as_deref().unwrap_or("<unnamed>");
        let Some(spec) = &pod.spec else { continue };
        for container in &spec.containers {
            merge_container(&mut env, &mut origins, pod_name, container, fetcher).await?;
        }
    }

    info!(
        event = "core.resolve.completed",
        pods = pods.len(),
        variables = env.len()
    );
    Ok(env)
}

/// Merge one container's declared environment into the working set.
///
/// External references first, inline declarations last, so inline values
/// always override whatever the referenced objects supplied.
async fn merge_container<F: ConfigFetcher>(
    env: &mut EnvSet,
    origins: &mut HashMap<String, String>,
    pod_name: &str,
    container: &Container,
    fetcher: &F,
) -> Result<(), ResolveError> {
    let origin = format!("{pod_name}/{}", container.name);
    debug!(event = "core.resolve.container_started", container = %origin);

    if let Some(sources) = &container.env_from {
        for source in sources {
            // An entry may carry a plain reference, a sensitive reference,
            // both, or neither. Absence of either kind is not an error.
            if let Some(reference) = &source.config_map_ref {
                let name = reference.name.as_str();
                let map = fetcher.fetch_plain(name).await?;
                for (key, value) in &map {
                    merge_var(env, origins, &origin, key, value);
                }
            }
            if let Some(reference) = &source.secret_ref {
                let name = reference.name.as_str();
                let map = fetcher.fetch_sensitive(name).await?;
                for (key, bytes) in &map {
                    let value = decode_sensitive(name, key, bytes);
                    merge_var(env, origins, &origin, key, &value);
                }
            }
        }
    }

    if let Some(vars) = &container.env {
        for var in vars {
            // `valueFrom` indirection is not expanded; such entries merge
            // with an empty value, same as an explicit empty declaration.
            let value = var.value.as_deref().unwrap_or_default();
            merge_var(env, origins, &origin, &var.name, value);
        }
    }

    Ok(())
}

fn merge_var(
    env: &mut EnvSet,
    origins: &mut HashMap<String, String>,
    origin: &str,
    name: &str,
    value: &str,
) {
    if let Some(previous) = origins.get(name) {
        if previous != origin {
            warn!(
                event = "core.resolve.cross_container_override",
                name = name,
                previous = %previous,
                current = %origin
            );
        }
    }
    env.set(name, value);
    origins.insert(name.to_string(), origin.to_string());
}

/// Sensitive values are stored as bytes but assumed to hold text. Non-UTF-8
/// payloads are decoded lossily and flagged, never treated as fatal.
fn decode_sensitive(object: &str, key: &str, bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            warn!(
                event = "core.resolve.sensitive_value_not_utf8",
                object = object,
                key = key
            );
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}
