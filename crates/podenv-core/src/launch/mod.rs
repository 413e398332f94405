//! Shell launcher: hand control to an interactive shell carrying the
//! resolved environment.
//!
//! Two strategies implement the one launch contract, selected once at startup
//! by platform capability and never re-evaluated mid-run:
//!
//! - **ReplaceImage** (unix): replace the current process image via `execve`.
//!   The invoking process becomes the shell; on success nothing returns.
//! - **SpawnChild** (everywhere else): spawn the shell as a child with
//!   inherited stdio, forward OS signals to it for its lifetime, and exit
//!   with the child's own status.
//!
//! The shell binary comes from the invoking process's `SHELL` variable, never
//! from the resolved set. The resolved set supplies the shell's internal
//! environment, not the program to execute.

mod errors;
#[cfg(unix)]
mod signals;

use std::process::Stdio;

use tracing::{debug, info, warn};

use crate::env::EnvSet;

pub use errors::LaunchError;

/// Arguments passed to the shell: interactive, read commands from stdin.
const SHELL_ARGS: &[&str] = &["-i", "-s"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    ReplaceImage,
    SpawnChild,
}

/// Query platform capability for in-place process image replacement.
pub fn detect_launch_mode() -> LaunchMode {
    if cfg!(unix) {
        LaunchMode::ReplaceImage
    } else {
        LaunchMode::SpawnChild
    }
}

/// Open the interactive shell over `env`.
///
/// In [`LaunchMode::ReplaceImage`] a successful call never returns. In
/// [`LaunchMode::SpawnChild`] the child's exit status is returned for the
/// caller to exit with.
pub async fn launch_shell(env: &EnvSet) -> Result<i32, LaunchError> {
    let shell = shell_from_host()?;
    let mode = detect_launch_mode();
    info!(
        event = "core.launch.started",
        shell = %shell,
        mode = ?mode,
        variables = env.len()
    );

    match mode {
        LaunchMode::ReplaceImage => replace_image(&shell, env),
        LaunchMode::SpawnChild => spawn_child(&shell, env).await,
    }
}

/// The shell binary path from the invoking process's own environment.
fn shell_from_host() -> Result<String, LaunchError> {
    match std::env::var("SHELL") {
        Ok(shell) if !shell.is_empty() => Ok(shell),
        _ => Err(LaunchError::ShellNotSet),
    }
}

/// Full argument vector for the shell, argv[0] included.
fn shell_argv(shell: &str) -> Vec<String> {
    std::iter::once(shell.to_string())
        .chain(SHELL_ARGS.iter().map(|s| s.to_string()))
        .collect()
}

#[cfg(unix)]
fn replace_image(shell: &str, env: &EnvSet) -> Result<i32, LaunchError> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let argv0 = which::which(shell).map_err(|source| LaunchError::ShellNotFound {
        shell: shell.to_string(),
        source,
    })?;
    debug!(event = "core.launch.executable_located", path = %argv0.display());

    let path = CString::new(argv0.as_os_str().as_bytes()).map_err(|e| LaunchError::ExecFailed {
        shell: shell.to_string(),
        message: e.to_string(),
    })?;
    let argv = to_cstrings(shell_argv(shell), shell)?;
    let envp = to_cstrings(env.to_env_pairs(), shell)?;

    match nix::unistd::execve(&path, &argv, &envp) {
        Ok(never) => match never {},
        Err(errno) => Err(LaunchError::ExecFailed {
            shell: shell.to_string(),
            message: errno.to_string(),
        }),
    }
}

#[cfg(not(unix))]
fn replace_image(shell: &str, _env: &EnvSet) -> Result<i32, LaunchError> {
    Err(LaunchError::ExecFailed {
        shell: shell.to_string(),
        message: "in-place process replacement is not supported on this platform".to_string(),
    })
}

#[cfg(unix)]
fn to_cstrings(strings: Vec<String>, shell: &str) -> Result<Vec<std::ffi::CString>, LaunchError> {
    strings
        .into_iter()
        .map(|s| {
            std::ffi::CString::new(s).map_err(|e| LaunchError::ExecFailed {
                shell: shell.to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}

async fn spawn_child(shell: &str, env: &EnvSet) -> Result<i32, LaunchError> {
    debug!(event = "core.launch.child_spawn_started", shell = shell);

    let mut cmd = tokio::process::Command::new(shell);
    cmd.args(SHELL_ARGS)
        .env_clear()
        .envs(env.iter())
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    run_child(cmd, shell).await
}

/// Spawn the prepared command, keep signals flowing to it while it runs,
/// and map its exit status for the caller.
async fn run_child(
    mut cmd: tokio::process::Command,
    shell: &str,
) -> Result<i32, LaunchError> {
    let mut child = cmd.spawn().map_err(|source| LaunchError::SpawnFailed {
        shell: shell.to_string(),
        source,
    })?;

    match wait_with_forwarding(&mut child).await {
        Ok(status) => {
            let code = exit_code(status);
            info!(event = "core.launch.child_exited", code = code);
            Ok(code)
        }
        Err(source) => {
            let _ = child.start_kill();
            Err(LaunchError::WaitFailed { source })
        }
    }
}

/// Wait for the child to exit while relaying the signals this platform can
/// observe. Handlers are installed before waiting begins so no signal is
/// lost between spawn and wait.
#[cfg(unix)]
async fn wait_with_forwarding(
    child: &mut tokio::process::Child,
) -> std::io::Result<std::process::ExitStatus> {
    if let Some(pid) = child.id() {
        match signals::install() {
            Ok(streams) => {
                tokio::spawn(signals::forward_to_child(
                    streams,
                    nix::unistd::Pid::from_raw(pid as i32),
                ));
            }
            Err(e) => {
                warn!(event = "core.launch.signal_register_failed", error = %e);
            }
        }
    }
    child.wait().await
}

#[cfg(windows)]
async fn wait_with_forwarding(
    child: &mut tokio::process::Child,
) -> std::io::Result<std::process::ExitStatus> {
    use tokio::signal::windows::{ctrl_break, ctrl_c};

    let (mut interrupt, mut break_event) = match (ctrl_c(), ctrl_break()) {
        (Ok(interrupt), Ok(break_event)) => (interrupt, break_event),
        (Err(e), _) | (_, Err(e)) => {
            warn!(event = "core.launch.signal_register_failed", error = %e);
            return child.wait().await;
        }
    };

    loop {
        tokio::select! {
            status = child.wait() => return status,
            _ = interrupt.recv() => {
                // Console control events fan out to the whole console group;
                // the child already receives Ctrl-C natively. Our handler
                // keeps the parent alive so the child decides how to react.
                debug!(event = "core.launch.signal_observed", signal = "CTRL_C");
            }
            _ = break_event.recv() => {
                debug!(event = "core.launch.signal_forwarded", signal = "CTRL_BREAK");
                let _ = child.start_kill();
            }
        }
    }
}

#[cfg(not(any(unix, windows)))]
async fn wait_with_forwarding(
    child: &mut tokio::process::Child,
) -> std::io::Result<std::process::ExitStatus> {
    child.wait().await
}

/// Map an exit status to the code the invoking process should exit with.
/// Signal death maps to the conventional 128+signo on unix.
fn exit_code(status: std::process::ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        status
            .code()
            .unwrap_or_else(|| 128 + status.signal().unwrap_or(1))
    }
    #[cfg(not(unix))]
    {
        status.code().unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_argv_is_interactive_stdin() {
        assert_eq!(shell_argv("/bin/bash"), vec!["/bin/bash", "-i", "-s"]);
    }

    #[test]
    fn test_shell_from_host_reads_shell_var() {
        temp_env::with_var("SHELL", Some("/bin/zsh"), || {
            assert_eq!(shell_from_host().unwrap(), "/bin/zsh");
        });
    }

    #[test]
    fn test_shell_from_host_unset_is_an_error() {
        temp_env::with_var("SHELL", None::<&str>, || {
            assert!(matches!(shell_from_host(), Err(LaunchError::ShellNotSet)));
        });
    }

    #[cfg(unix)]
    #[test]
    fn test_detect_launch_mode_prefers_replacement_on_unix() {
        assert_eq!(detect_launch_mode(), LaunchMode::ReplaceImage);
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_image_missing_executable_fails_before_exec() {
        let env = EnvSet::new();
        let result = replace_image("podenv-no-such-shell", &env);
        match result {
            Err(LaunchError::ShellNotFound { shell, .. }) => {
                assert_eq!(shell, "podenv-no-such-shell");
            }
            other => panic!("expected ShellNotFound, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_forwarded_signal_reaches_spawned_child() {
        let mut cmd = tokio::process::Command::new("sleep");
        cmd.arg("30")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // run_child installs the forwarding handlers before it starts
        // waiting, so by the time this fires the parent catches the signal
        // and relays it instead of dying to the default disposition.
        let killer = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_millis(300)).await;
            nix::sys::signal::kill(nix::unistd::Pid::this(), nix::sys::signal::Signal::SIGTERM)
                .expect("delivering SIGTERM to ourselves should work");
        });

        let code = run_child(cmd, "sleep").await.expect("wait should succeed");
        killer.await.expect("signal task should finish");
        assert_eq!(code, 128 + 15, "child should die to the forwarded SIGTERM");
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_code_maps_signal_death() {
        use std::os::unix::process::ExitStatusExt;
        // Raw wait status: exit(3) is 3 << 8, death by SIGTERM is 15.
        let exited = std::process::ExitStatus::from_raw(3 << 8);
        assert_eq!(exit_code(exited), 3);
        let signalled = std::process::ExitStatus::from_raw(15);
        assert_eq!(exit_code(signalled), 128 + 15);
    }
}
