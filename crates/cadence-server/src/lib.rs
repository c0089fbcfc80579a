//! REST gateway over cadence-core.
//!
//! Exposes the CRUD and metric-read endpoints as authenticated JSON
//! routes. The server holds no domain state of its own: every request
//! loads from the store, applies core logic, and persists the result.

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;

use std::net::SocketAddr;

use cadence_core::{Config, Store};

/// Bind the configured address and serve requests until shutdown.
pub async fn serve(store: Store, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState::new(store, config);
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("cadence server listening on http://{addr}");
    axum::serve(listener, router).await?;
    Ok(())
}
