use tracing_subscriber::{fmt, EnvFilter};

/// Install the global stderr subscriber. Safe to call from every binary
/// and from tests; later calls are no-ops once a dispatcher exists.
pub fn init_logging(default_level: &str) {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
