use crate::transport::{
    PeerTransport, TransportConfig, TransportEvent, TransportEventSender, TransportFactory,
};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use tandem_core::{IceServerConfig, Payload, Role};
use tokio::sync::Mutex;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

type SharedChannel = Arc<Mutex<Option<Arc<RTCDataChannel>>>>;

/// [`PeerTransport`] backed by a webrtc-rs peer connection with one data channel.
pub struct RtcTransport {
    peer_connection: Arc<RTCPeerConnection>,
    data_channel: SharedChannel,
}

impl RtcTransport {
    /// The initiator opens the data channel itself; the receiver waits for
    /// the remote side to announce it.
    pub async fn new(
        role: Role,
        ice_servers: &[IceServerConfig],
        channel_label: &str,
        events: TransportEventSender,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers.iter().map(to_rtc_ice_server).collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("Failed to create peer connection")?,
        );
        let data_channel: SharedChannel = Arc::new(Mutex::new(None));

        let state_events = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let events = state_events.clone();
                Box::pin(async move {
                    info!("Peer connection state changed: {:?}", s);
                    if matches!(
                        s,
                        RTCPeerConnectionState::Failed
                            | RTCPeerConnectionState::Disconnected
                            | RTCPeerConnectionState::Closed
                    ) {
                        events.emit(TransportEvent::Closed);
                    }
                })
            },
        ));

        // Trickle ICE: every local candidate goes to the peer as soon as it is found.
        let ice_events = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let events = ice_events.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let Ok(value) = serde_json::to_value(&init) else {
                    return;
                };
                events.emit(TransportEvent::CandidateGenerated(Payload::new(value)));
            })
        }));

        match role {
            Role::Initiator => {
                let dc = peer_connection
                    .create_data_channel(channel_label, None)
                    .await
                    .context("Failed to create data channel")?;
                setup_data_channel(dc, data_channel.clone(), events);
            }
            Role::Receiver => {
                let slot = data_channel.clone();
                peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
                    let slot = slot.clone();
                    let events = events.clone();
                    Box::pin(async move {
                        debug!("Remote announced data channel '{}'", dc.label());
                        setup_data_channel(dc, slot, events);
                    })
                }));
            }
        }

        Ok(Self {
            peer_connection,
            data_channel,
        })
    }
}

fn to_rtc_ice_server(server: &IceServerConfig) -> RTCIceServer {
    RTCIceServer {
        urls: server.urls.clone(),
        username: server.username.clone().unwrap_or_default(),
        credential: server.credential.clone().unwrap_or_default(),
        ..Default::default()
    }
}

fn setup_data_channel(dc: Arc<RTCDataChannel>, slot: SharedChannel, events: TransportEventSender) {
    let dc_on_open = dc.clone();
    let open_events = events.clone();
    dc.on_open(Box::new(move || {
        let events = open_events.clone();
        let channel = dc_on_open.clone();
        let slot = slot.clone();
        Box::pin(async move {
            info!("Data channel '{}' open", channel.label());
            *slot.lock().await = Some(channel);
            events.emit(TransportEvent::ChannelOpen);
        })
    }));

    let msg_events = events.clone();
    dc.on_message(Box::new(move |msg: DataChannelMessage| {
        let events = msg_events.clone();
        Box::pin(async move {
            events.emit(TransportEvent::Message(Bytes::from(msg.data.to_vec())));
        })
    }));

    dc.on_close(Box::new(move || {
        let events = events.clone();
        Box::pin(async move {
            debug!("Data channel closed");
            events.emit(TransportEvent::Closed);
        })
    }));
}

fn to_payload(description: &RTCSessionDescription) -> Result<Payload> {
    Ok(Payload::new(serde_json::to_value(description)?))
}

fn to_description(payload: Payload) -> Result<RTCSessionDescription> {
    serde_json::from_value(payload.into_inner()).context("Malformed session description")
}

#[async_trait]
impl PeerTransport for RtcTransport {
    async fn create_offer(&self) -> Result<Payload> {
        let offer = self.peer_connection.create_offer(None).await?;
        to_payload(&offer)
    }

    async fn create_answer(&self) -> Result<Payload> {
        let answer = self.peer_connection.create_answer(None).await?;
        to_payload(&answer)
    }

    async fn set_local_description(&self, description: Payload) -> Result<()> {
        let desc = to_description(description)?;
        self.peer_connection.set_local_description(desc).await?;
        Ok(())
    }

    async fn set_remote_description(&self, description: Payload) -> Result<()> {
        let desc = to_description(description)?;
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: Payload) -> Result<()> {
        let init: RTCIceCandidateInit = serde_json::from_value(candidate.into_inner())
            .context("Failed to parse ICE candidate JSON")?;
        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn send(&self, data: Bytes) -> Result<()> {
        let Some(dc) = self.data_channel.lock().await.clone() else {
            bail!("data channel is not open yet");
        };
        dc.send(&data).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

/// Creates an [`RtcTransport`] per attempt. ICE servers advertised by the
/// broker take precedence over the configured ones.
#[derive(Debug, Clone, Default)]
pub struct RtcTransportFactory {
    config: TransportConfig,
}

impl RtcTransportFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TransportFactory for RtcTransportFactory {
    type Transport = RtcTransport;

    async fn create(
        &self,
        role: Role,
        ice_servers: &[IceServerConfig],
        events: TransportEventSender,
    ) -> Result<RtcTransport> {
        let servers = if ice_servers.is_empty() {
            &self.config.ice_servers[..]
        } else {
            ice_servers
        };
        RtcTransport::new(role, servers, &self.config.channel_label, events).await
    }
}
