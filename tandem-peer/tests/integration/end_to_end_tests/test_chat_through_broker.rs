use bytes::Bytes;
use std::time::Duration;
use tandem_core::Role;
use tandem_peer::{PeerEvent, run_client};
use tandem_server::BrokerConfig;
use tokio::sync::mpsc;

use crate::integration::{init_tracing, spawn_broker};
use crate::utils::{MockNetwork, MockTransportFactory, wait_for_event};

const WAIT: Duration = Duration::from_secs(5);

struct Client {
    input: mpsc::Sender<Bytes>,
    events: mpsc::UnboundedReceiver<PeerEvent>,
}

fn start_client(url: &str, room: &str, factory: MockTransportFactory) -> Client {
    let (input_tx, input_rx) = mpsc::channel(8);
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let url = url.to_string();
    let room = room.to_string();
    tokio::spawn(async move {
        let _ = run_client(&url, Some(room), factory, input_rx, events_tx).await;
    });
    Client {
        input: input_tx,
        events: events_rx,
    }
}

#[tokio::test]
async fn test_two_clients_exchange_messages() {
    init_tracing();

    let (url, _addr) = spawn_broker(BrokerConfig::default()).await;
    let network = MockNetwork::new();

    let mut alice = start_client(&url, "tea", MockTransportFactory::on_network(network.clone()));
    let role = wait_for_event(&mut alice.events, WAIT, |e| {
        matches!(e, PeerEvent::RoleAssigned { .. })
    })
    .await;
    assert!(matches!(
        role,
        PeerEvent::RoleAssigned {
            role: Role::Initiator,
            ..
        }
    ));

    let mut bob = start_client(&url, "tea", MockTransportFactory::on_network(network));
    let role = wait_for_event(&mut bob.events, WAIT, |e| {
        matches!(e, PeerEvent::RoleAssigned { .. })
    })
    .await;
    assert!(matches!(
        role,
        PeerEvent::RoleAssigned {
            role: Role::Receiver,
            ..
        }
    ));

    wait_for_event(&mut alice.events, WAIT, |e| *e == PeerEvent::ChannelReady).await;
    wait_for_event(&mut bob.events, WAIT, |e| *e == PeerEvent::ChannelReady).await;

    alice.input.send(Bytes::from_static(b"hello bob")).await.unwrap();
    let got = wait_for_event(&mut bob.events, WAIT, |e| matches!(e, PeerEvent::Message(_))).await;
    assert_eq!(got, PeerEvent::Message(Bytes::from_static(b"hello bob")));

    bob.input.send(Bytes::from_static(b"hi alice")).await.unwrap();
    let got =
        wait_for_event(&mut alice.events, WAIT, |e| matches!(e, PeerEvent::Message(_))).await;
    assert_eq!(got, PeerEvent::Message(Bytes::from_static(b"hi alice")));
}

#[tokio::test]
async fn test_third_client_is_rejected() {
    init_tracing();

    let (url, _addr) = spawn_broker(BrokerConfig::default()).await;
    let network = MockNetwork::new();

    let mut first = start_client(&url, "pair", MockTransportFactory::on_network(network.clone()));
    wait_for_event(&mut first.events, WAIT, |e| {
        matches!(e, PeerEvent::RoleAssigned { .. })
    })
    .await;
    let mut second = start_client(&url, "pair", MockTransportFactory::on_network(network.clone()));
    wait_for_event(&mut second.events, WAIT, |e| {
        matches!(e, PeerEvent::RoleAssigned { .. })
    })
    .await;

    let mut third = start_client(&url, "pair", MockTransportFactory::on_network(network));
    let rejected = wait_for_event(&mut third.events, WAIT, |e| {
        matches!(e, PeerEvent::JoinRejected { .. } | PeerEvent::RoleAssigned { .. })
    })
    .await;

    assert!(matches!(rejected, PeerEvent::JoinRejected { .. }));
}

#[tokio::test]
async fn test_receiver_promoted_when_initiator_leaves() {
    init_tracing();

    let (url, _addr) = spawn_broker(BrokerConfig::default()).await;
    let network = MockNetwork::new();

    let mut alice = start_client(&url, "swap", MockTransportFactory::on_network(network.clone()));
    wait_for_event(&mut alice.events, WAIT, |e| {
        matches!(e, PeerEvent::RoleAssigned { .. })
    })
    .await;
    let mut bob = start_client(&url, "swap", MockTransportFactory::on_network(network));
    wait_for_event(&mut bob.events, WAIT, |e| *e == PeerEvent::ChannelReady).await;

    // Dropping the input ends alice's client and closes her broker connection.
    drop(alice.input);

    let promoted = wait_for_event(&mut bob.events, WAIT, |e| {
        matches!(
            e,
            PeerEvent::RoleAssigned {
                role: Role::Initiator,
                ..
            }
        )
    })
    .await;
    assert!(matches!(promoted, PeerEvent::RoleAssigned { .. }));
}
