use bytes::Bytes;
use tandem_core::{ConnectionId, Role, RoomId, SignalKind, SignalMessage};
use tandem_peer::{Participant, PeerEvent, SignalingPhase, TransportEvent};
use tokio::sync::mpsc;

use crate::integration::init_tracing;
use crate::utils::{
    MockTransportFactory, drain, offer_payload, pump, role_msg, signal, signals,
};

#[tokio::test]
async fn test_promotion_discards_current_attempt() {
    init_tracing();

    let factory = MockTransportFactory::new();
    let (out_tx, mut outbound) = mpsc::unbounded_channel();
    let (events_tx, _events) = mpsc::unbounded_channel();
    let (mut p, mut transport_rx) = Participant::new(factory.clone(), out_tx, events_tx);

    p.handle_broker(role_msg("r1", Role::Receiver)).await.unwrap();
    p.handle_broker(signal("r1", SignalKind::Offer, offer_payload("o1")))
        .await
        .unwrap();
    pump(&mut p, &mut transport_rx).await;
    assert_eq!(p.phase(), Some(SignalingPhase::Stable));
    let receiver_transport = factory.latest();
    drain(&mut outbound);

    // The initiator left; the broker promotes us.
    p.handle_broker(role_msg("r1", Role::Initiator)).await.unwrap();

    assert!(receiver_transport.is_closed());
    assert_eq!(p.role(), Some(Role::Initiator));
    assert_eq!(p.phase(), Some(SignalingPhase::Idle));
    assert!(!p.peer_present());
    assert!(!p.is_channel_ready());
    assert_eq!(factory.latest().role(), Some(Role::Initiator));
    assert!(signals(&mut outbound).is_empty());

    p.handle_broker(SignalMessage::PeerJoined {
        room: RoomId::from("r1"),
        connection_id: ConnectionId::new(),
    })
    .await
    .unwrap();
    assert_eq!(signals(&mut outbound)[0].kind, SignalKind::Offer);
}

#[tokio::test]
async fn test_events_from_discarded_transport_are_ignored() {
    init_tracing();

    let factory = MockTransportFactory::new();
    let (out_tx, mut outbound) = mpsc::unbounded_channel();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let (mut p, _transport_rx) = Participant::new(factory.clone(), out_tx, events_tx);

    p.handle_broker(role_msg("r1", Role::Receiver)).await.unwrap();
    let stale = p.generation();
    p.handle_broker(role_msg("r1", Role::Initiator)).await.unwrap();
    drain(&mut events);

    p.handle_transport(stale, TransportEvent::Message(Bytes::from_static(b"old")))
        .await;
    p.handle_transport(stale, TransportEvent::ChannelOpen).await;
    p.handle_transport(stale, TransportEvent::Closed).await;
    p.handle_transport(
        stale,
        TransportEvent::CandidateGenerated(crate::utils::candidate_payload(5)),
    )
    .await;

    assert!(drain(&mut events).is_empty());
    assert!(signals(&mut outbound).is_empty());

    // The current generation still gets through.
    p.handle_transport(p.generation(), TransportEvent::Message(Bytes::from_static(b"new")))
        .await;
    assert_eq!(
        drain(&mut events),
        vec![PeerEvent::Message(Bytes::from_static(b"new"))]
    );
}

#[tokio::test]
async fn test_switching_rooms_starts_over() {
    init_tracing();

    let factory = MockTransportFactory::new();
    let (out_tx, _outbound) = mpsc::unbounded_channel();
    let (events_tx, _events) = mpsc::unbounded_channel();
    let (mut p, _transport_rx) = Participant::new(factory.clone(), out_tx, events_tx);

    p.handle_broker(role_msg("r1", Role::Initiator)).await.unwrap();
    p.handle_broker(role_msg("r2", Role::Initiator)).await.unwrap();

    assert_eq!(p.room(), Some(&RoomId::from("r2")));
    assert_eq!(factory.created().len(), 2);
    assert!(factory.created()[0].is_closed());
}

#[tokio::test]
async fn test_shutdown_closes_transport() {
    init_tracing();

    let factory = MockTransportFactory::new();
    let (out_tx, _outbound) = mpsc::unbounded_channel();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let (mut p, _transport_rx) = Participant::new(factory.clone(), out_tx, events_tx);

    p.handle_broker(role_msg("r1", Role::Receiver)).await.unwrap();
    let generation = p.generation();
    p.shutdown().await;

    assert!(factory.latest().is_closed());
    assert_eq!(p.phase(), None);
    drain(&mut events);
    p.handle_transport(generation, TransportEvent::Closed).await;
    assert!(drain(&mut events).is_empty());
}
