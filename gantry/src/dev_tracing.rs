//! Log output for embedding programs and local runs.

use tracing_subscriber::EnvFilter;

/// Print gateway log lines to stderr, filtered by `RUST_LOG`.
///
/// Lines are compact and carry no module target; the component is already
/// named by the `[GATEWAY]`, `[DECODE]`, `[ROUTER]`, `[CONFIG]` or
/// `[OPTIONS]` prefix. Nothing is installed when `RUST_LOG` is unset or does
/// not parse, or when the process already has a global subscriber.
pub fn init_tracing() {
    let Ok(filter) = EnvFilter::try_from_default_env() else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
