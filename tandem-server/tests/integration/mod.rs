//! Integration tests for tandem-server.
//!
//! Tests are organized by functionality:
//! - `connection_tests` - joining, capacity and disconnect handling
//! - `messaging_tests` - signal relay
//! - `multi_peer_tests` - several clients over real WebSockets


use std::net::SocketAddr;
use std::sync::Arc;
use tracing::Level;

use tandem_server::{BrokerConfig, SignalingService};
use tokio::net::TcpListener;

use crate::utils::MockSignalingOutput;

/// Initialize tracing for tests (call once per test).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A broker whose outgoing messages are captured by the returned mock.
pub fn create_test_service() -> (SignalingService, MockSignalingOutput) {
    let output = MockSignalingOutput::new();
    let service = SignalingService::with_output(BrokerConfig::default(), Arc::new(output.clone()));
    (service, output)
}

/// Runs a real broker on an ephemeral port. It lives until the test runtime stops.
pub async fn spawn_test_server() -> (SocketAddr, SignalingService) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener address");
    let service = SignalingService::new(BrokerConfig::default());

    tokio::spawn(tandem_server::serve(
        listener,
        service.clone(),
        std::future::pending(),
    ));

    (addr, service)
}
