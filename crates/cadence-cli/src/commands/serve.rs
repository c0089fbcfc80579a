use tracing_subscriber::EnvFilter;

use cadence_core::{Config, Store};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load_or_default();
    let store = Store::open()?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(cadence_server::serve(store, &config))
}
