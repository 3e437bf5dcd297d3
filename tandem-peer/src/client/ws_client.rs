use crate::event::PeerEvent;
use crate::session::Participant;
use crate::transport::TransportFactory;
use anyhow::{Context, Result};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tandem_core::SignalMessage;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// Connects to a broker, joins `room` and drives a [`Participant`] until the
/// broker closes the connection or `input` is dropped.
///
/// Every item received on `input` is sent to the peer once the channel is
/// ready. Progress is reported on `events`.
pub async fn run_client<F: TransportFactory>(
    url: &str,
    room: Option<String>,
    factory: F,
    mut input: mpsc::Receiver<Bytes>,
    events: mpsc::UnboundedSender<PeerEvent>,
) -> Result<()> {
    let (ws, _) = connect_async(url)
        .await
        .with_context(|| format!("Failed to connect to broker at {url}"))?;
    info!("Connected to {}", url);
    let (mut write, mut read) = ws.split();

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<SignalMessage>();
    let (mut participant, mut transport_rx) = Participant::new(factory, out_tx, events);
    participant.join(room.as_deref());

    let result = loop {
        tokio::select! {
            Some(msg) = out_rx.recv() => {
                let json = match msg.to_json() {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("Failed to serialize outgoing message: {}", e);
                        continue;
                    }
                };
                if let Err(e) = write.send(Message::Text(json.into())).await {
                    break Err(e).context("Broker connection lost");
                }
            }

            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => match SignalMessage::from_json(&text) {
                    Ok(msg) => {
                        if let Err(e) = participant.handle_broker(msg).await {
                            break Err(e);
                        }
                    }
                    Err(e) => warn!("Unparseable message from broker: {}", e),
                },
                Some(Ok(Message::Close(_))) | None => {
                    info!("Broker closed the connection");
                    break Ok(());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => break Err(e).context("Broker connection failed"),
            },

            Some((generation, event)) = transport_rx.recv() => {
                participant.handle_transport(generation, event).await;
            }

            data = input.recv() => match data {
                Some(data) => {
                    if let Err(e) = participant.send(data).await {
                        warn!("Message not sent: {:#}", e);
                    }
                }
                None => {
                    debug!("Input closed, leaving");
                    break Ok(());
                }
            },
        }
    };

    participant.shutdown().await;
    let _ = write.close().await;
    result
}
