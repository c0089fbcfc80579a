use tracing_subscriber::EnvFilter;

use cadence_core::{Config, Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load_or_default();
    let store = Store::open()?;
    cadence_server::serve(store, &config).await
}
