use crate::SignalingService;
use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use tandem_core::SignalMessage;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// `GET /ws` upgrades to the signaling socket, `GET /health` answers `ok`.
pub fn router(service: SignalingService) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .with_state(service)
}

async fn health() -> &'static str {
    "ok"
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, service))
}

async fn handle_socket(socket: WebSocket, service: SignalingService) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<SignalMessage>();

    let connection_id = service.connect(tx).await;
    info!("New WebSocket connection: {}", connection_id);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match msg.to_json() {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize signal message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match SignalMessage::from_json(&text) {
                        Ok(signal) => {
                            if let Err(e) = service.handle_message(connection_id, signal).await {
                                warn!("{}", e);
                            }
                        }
                        Err(e) => {
                            warn!("Invalid SignalMessage from {}: {}", connection_id, e)
                        }
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    service.disconnect(connection_id).await;
    info!("WebSocket disconnected: {}", connection_id);
}
