//! Signal forwarding for the child-process launch mode.
//!
//! While the shell runs as a child, the invoking process still owns the
//! terminal's signal delivery. Each forwarded signal is relayed to the child
//! so Ctrl-C, terminal resizes and friends behave as if the shell were the
//! foreground process.

use nix::sys::signal::Signal;
use nix::unistd::Pid;
use tokio::signal::unix::{Signal as SignalStream, SignalKind, signal};
use tracing::debug;

pub(crate) struct Forwarded {
    interrupt: SignalStream,
    terminate: SignalStream,
    quit: SignalStream,
    hangup: SignalStream,
    window_change: SignalStream,
    user_defined1: SignalStream,
    user_defined2: SignalStream,
}

/// Install handlers for every forwarded signal.
///
/// Must happen before the caller starts waiting on the child, so a signal
/// arriving right after spawn hits a registered handler instead of the
/// parent's default disposition.
pub(crate) fn install() -> std::io::Result<Forwarded> {
    Ok(Forwarded {
        interrupt: signal(SignalKind::interrupt())?,
        terminate: signal(SignalKind::terminate())?,
        quit: signal(SignalKind::quit())?,
        hangup: signal(SignalKind::hangup())?,
        window_change: signal(SignalKind::window_change())?,
        user_defined1: signal(SignalKind::user_defined1())?,
        user_defined2: signal(SignalKind::user_defined2())?,
    })
}

/// Relay signals to the child for as long as it runs.
///
/// The loop has no termination condition of its own; the task is reclaimed
/// when the invoking process exits after the child has been reaped.
pub(crate) async fn forward_to_child(mut streams: Forwarded, pid: Pid) {
    loop {
        let sig = tokio::select! {
            _ = streams.interrupt.recv() => Signal::SIGINT,
            _ = streams.terminate.recv() => Signal::SIGTERM,
            _ = streams.quit.recv() => Signal::SIGQUIT,
            _ = streams.hangup.recv() => Signal::SIGHUP,
            _ = streams.window_change.recv() => Signal::SIGWINCH,
            _ = streams.user_defined1.recv() => Signal::SIGUSR1,
            _ = streams.user_defined2.recv() => Signal::SIGUSR2,
        };

        match nix::sys::signal::kill(pid, sig) {
            Ok(()) => {
                debug!(event = "core.launch.signal_forwarded", signal = %sig, pid = pid.as_raw());
            }
            Err(e) => {
                // The child may already have exited; nothing to recover.
                debug!(event = "core.launch.signal_forward_failed", signal = %sig, error = %e);
            }
        }
    }
}
