use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber. `RUST_LOG` overrides the default filter.
pub fn init(verbose: bool) {
    let filter = if verbose { "docqa=debug,tower_http=debug" } else { "docqa=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();
}
