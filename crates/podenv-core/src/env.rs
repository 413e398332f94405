//! Ordered variable set accumulating the resolved environment.
//!
//! Insertion order is tracked for diagnostics (log output lists variables in
//! the order they were merged), while lookups and overwrites go through a map
//! so each name holds exactly one value.

use std::collections::HashMap;

use tracing::debug;

/// Variables seeded from the invoking process so the shell prompt renders
/// correctly even when the target containers declare neither.
const HOST_DEFAULT_VARS: &[&str] = &["TERM", "LANG"];

/// De-duplicated, insertion-ordered collection of environment variables.
///
/// Invariant: `keys` and `values` always describe the same name set. Setting
/// an existing name overwrites its value in place without duplicating the
/// sequence entry; setting a new name appends it.
#[derive(Debug)]
pub struct EnvSet {
    keys: Vec<String>,
    values: HashMap<String, String>,
}

impl EnvSet {
    /// Create a set pre-seeded with host defaults (`TERM`, `LANG`).
    ///
    /// Container-derived values merged later override the seeds on collision.
    pub fn new() -> Self {
        let mut set = Self {
            keys: Vec::new(),
            values: HashMap::new(),
        };
        for name in HOST_DEFAULT_VARS {
            set.set_from_host(name);
        }
        set
    }

    /// Insert or overwrite a variable.
    pub fn set(&mut self, name: &str, value: &str) {
        if self.values.insert(name.to_string(), value.to_string()).is_none() {
            self.keys.push(name.to_string());
        }
    }

    /// Copy a variable from the invoking process's own environment.
    ///
    /// A name absent from the host environment still produces an entry with
    /// an empty value, keeping the result deterministic on bare hosts.
    pub fn set_from_host(&mut self, name: &str) {
        let value = std::env::var(name).unwrap_or_default();
        if value.is_empty() {
            debug!(event = "core.env.host_var_empty", name = name);
        }
        self.set(name, &value);
    }

    /// Variable names in the order they were first set.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Current value for `name`, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keys
            .iter()
            .map(|k| (k.as_str(), self.values.get(k).map(String::as_str).unwrap_or("")))
    }

    /// Render `NAME=value` strings for handing to a process environment.
    ///
    /// Enumeration order follows the underlying map and is unspecified;
    /// process environments carry no ordering semantics.
    pub fn to_env_pairs(&self) -> Vec<String> {
        self.values.iter().map(|(k, v)| format!("{k}={v}")).collect()
    }
}

impl Default for EnvSet {
    fn default() -> Self {
        Self::new()
    }
}
