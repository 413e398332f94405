//! podenv-core: Core library for teleporting a terminal into a pod's environment
//!
//! This library resolves the environment variables a Kubernetes workload's
//! containers would see (inline declarations plus `envFrom` ConfigMap/Secret
//! references) and opens an interactive local shell configured with the
//! merged result.
//!
//! # Main Entry Points
//!
//! - [`cluster`] - Kubernetes client construction, pod listing, config fetching
//! - [`resolve`] - Merge container environments into one [`EnvSet`]
//! - [`launch`] - Replace the current process with (or spawn) the shell

pub mod cluster;
pub mod env;
pub mod launch;
pub mod logging;
pub mod resolve;

pub use cluster::{ClusterError, ConfigFetcher, KubeFetcher};
pub use env::EnvSet;
pub use launch::{LaunchError, LaunchMode, detect_launch_mode, launch_shell};
pub use resolve::{ResolveError, resolve_environment};

// Re-export logging initialization
pub use logging::init_logging;
