//! Structured JSON logging to stderr.
//!
//! Events follow the `core.<module>.<action>` naming convention so log
//! consumers can filter on a stable field rather than message text.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Quiet mode still admits warnings: resolution diagnostics such as
/// cross-container overrides and lossy secret decoding are warnings, and
/// they must reach operators without opting into verbose output. Otherwise
/// the `RUST_LOG` environment variable controls the filter, defaulting to
/// `info`. Logs go to stderr so they never interleave with shell output on
/// stdout.
pub fn init_logging(quiet: bool) {
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(base_filter(quiet))
        .with_writer(std::io::stderr)
        .try_init();
}

fn base_filter(quiet: bool) -> EnvFilter {
    if quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_floor_admits_warnings() {
        assert_eq!(base_filter(true).to_string(), "warn");
    }
}
