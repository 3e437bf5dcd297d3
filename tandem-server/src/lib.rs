//! Signaling broker: pairs two clients per room, tells each its role and
//! relays their negotiation messages until they can talk directly.

mod config;
mod error;
mod registry;
mod room;
mod signaling;

pub use config::*;
pub use error::*;
pub use registry::*;
pub use room::*;
pub use signaling::*;

use anyhow::{Context, Result};
use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

/// Serves the broker on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, service: SignalingService, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("listener has no local address")?;
    info!("Signaling broker listening on {}", addr);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await
        .context("signaling server failed")
}
