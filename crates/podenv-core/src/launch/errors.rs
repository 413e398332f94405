#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("SHELL is not set in the invoking environment; cannot determine which shell to open")]
    ShellNotSet,

    #[error("Couldn't find the executable '{shell}': {source}")]
    ShellNotFound {
        shell: String,
        #[source]
        source: which::Error,
    },

    #[error("Failed to replace the current process with '{shell}': {message}")]
    ExecFailed { shell: String, message: String },

    #[error("Failed to start shell '{shell}': {source}")]
    SpawnFailed {
        shell: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for shell termination: {source}")]
    WaitFailed {
        #[source]
        source: std::io::Error,
    },
}
