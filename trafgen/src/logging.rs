use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr so `--output json` keeps stdout machine-readable.
/// `RUST_LOG` overrides the default `info` filter.
pub(crate) fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
