use tandem_core::{ConnectionId, Role, RoomId, SignalKind, SignalMessage};
use tandem_peer::{Participant, PeerEvent, SignalingPhase};
use tokio::sync::mpsc;

use crate::integration::init_tracing;
use crate::utils::{
    MockTransportFactory, candidate_payload, drain, offer_payload, pump, role_msg, signal, signals,
};

#[tokio::test]
async fn test_receiver_answers_relayed_offer() {
    init_tracing();

    let factory = MockTransportFactory::new();
    let (out_tx, mut outbound) = mpsc::unbounded_channel();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let (mut p, mut transport_rx) = Participant::new(factory.clone(), out_tx, events_tx);

    p.handle_broker(role_msg("r1", Role::Receiver)).await.unwrap();
    assert!(p.peer_present());

    p.handle_broker(signal("r1", SignalKind::Candidate, candidate_payload(1)))
        .await
        .unwrap();
    p.handle_broker(signal("r1", SignalKind::Offer, offer_payload("o1")))
        .await
        .unwrap();
    pump(&mut p, &mut transport_rx).await;

    let kinds: Vec<_> = signals(&mut outbound).iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![SignalKind::Answer, SignalKind::Candidate]);
    assert_eq!(p.phase(), Some(SignalingPhase::Stable));
    assert_eq!(factory.latest().candidates_added(), vec![candidate_payload(1)]);
    assert!(drain(&mut events).contains(&PeerEvent::ChannelReady));
}

#[tokio::test]
async fn test_signal_for_other_room_is_dropped() {
    init_tracing();

    let factory = MockTransportFactory::new();
    let (out_tx, mut outbound) = mpsc::unbounded_channel();
    let (events_tx, _events) = mpsc::unbounded_channel();
    let (mut p, _transport_rx) = Participant::new(factory.clone(), out_tx, events_tx);

    p.handle_broker(role_msg("r1", Role::Receiver)).await.unwrap();
    p.handle_broker(signal("elsewhere", SignalKind::Offer, offer_payload("o1")))
        .await
        .unwrap();

    assert_eq!(p.phase(), Some(SignalingPhase::Idle));
    assert!(factory.latest().calls().is_empty());
    assert!(signals(&mut outbound).is_empty());
}

#[tokio::test]
async fn test_signal_before_role_is_dropped() {
    init_tracing();

    let factory = MockTransportFactory::new();
    let (out_tx, _outbound) = mpsc::unbounded_channel();
    let (events_tx, _events) = mpsc::unbounded_channel();
    let (mut p, _transport_rx) = Participant::new(factory.clone(), out_tx, events_tx);

    p.handle_broker(signal("r1", SignalKind::Offer, offer_payload("o1")))
        .await
        .unwrap();

    assert_eq!(p.phase(), None);
    assert!(factory.created().is_empty());
}

#[tokio::test]
async fn test_join_rejection_is_reported() {
    init_tracing();

    let (out_tx, _outbound) = mpsc::unbounded_channel();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let (mut p, _transport_rx) = Participant::new(MockTransportFactory::new(), out_tx, events_tx);

    p.handle_broker(SignalMessage::JoinRejected {
        room: RoomId::from("full"),
        reason: "room full".to_string(),
    })
    .await
    .unwrap();

    assert_eq!(p.role(), None);
    assert_eq!(
        drain(&mut events),
        vec![PeerEvent::JoinRejected {
            room: RoomId::from("full"),
            reason: "room full".to_string()
        }]
    );
}

#[tokio::test]
async fn test_peer_joined_is_ignored_by_receiver_negotiation() {
    init_tracing();

    let factory = MockTransportFactory::new();
    let (out_tx, mut outbound) = mpsc::unbounded_channel();
    let (events_tx, _events) = mpsc::unbounded_channel();
    let (mut p, _transport_rx) = Participant::new(factory.clone(), out_tx, events_tx);

    p.handle_broker(role_msg("r1", Role::Receiver)).await.unwrap();
    p.handle_broker(SignalMessage::PeerJoined {
        room: RoomId::from("r1"),
        connection_id: ConnectionId::new(),
    })
    .await
    .unwrap();

    assert!(signals(&mut outbound).is_empty());
    assert_eq!(p.phase(), Some(SignalingPhase::Idle));
}
