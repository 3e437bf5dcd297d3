use tandem_core::{Role, RoomId};

use crate::integration::{create_test_service, init_tracing};
use crate::utils::{connect, join_msg};

#[tokio::test]
async fn test_initiator_disconnect_promotes_receiver() {
    init_tracing();

    let (service, output) = create_test_service();
    let a = connect(&service).await;
    let b = connect(&service).await;
    service.handle_message(a, join_msg("r2")).await.unwrap();
    service.handle_message(b, join_msg("r2")).await.unwrap();

    service.disconnect(a).await;

    let r2 = RoomId::from("r2");
    assert_eq!(service.rooms().current_members(&r2), vec![b]);
    assert_eq!(service.rooms().initiator_of(&r2), Some(b));
    assert_eq!(output.roles_for(&b).await, vec![Role::Receiver, Role::Initiator]);
    assert!(!service.registry().contains(&a));
}

#[tokio::test]
async fn test_receiver_disconnect_sends_no_role() {
    init_tracing();

    let (service, output) = create_test_service();
    let a = connect(&service).await;
    let b = connect(&service).await;
    service.handle_message(a, join_msg("r3")).await.unwrap();
    service.handle_message(b, join_msg("r3")).await.unwrap();

    service.disconnect(b).await;

    assert_eq!(output.roles_for(&a).await, vec![Role::Initiator]);
    assert_eq!(
        service.rooms().current_members(&RoomId::from("r3")),
        vec![a]
    );
}

#[tokio::test]
async fn test_last_disconnect_deletes_room() {
    init_tracing();

    let (service, _output) = create_test_service();
    let a = connect(&service).await;
    let b = connect(&service).await;
    service.handle_message(a, join_msg("r1")).await.unwrap();
    service.handle_message(b, join_msg("r1")).await.unwrap();

    service.disconnect(a).await;
    service.disconnect(b).await;

    assert!(!service.rooms().contains_room(&RoomId::from("r1")));
    assert_eq!(service.rooms().room_count(), 0);
    assert!(service.registry().is_empty());
}

#[tokio::test]
async fn test_disconnect_without_room_is_noop() {
    init_tracing();

    let (service, output) = create_test_service();
    let a = connect(&service).await;
    let sent_before = output.len().await;

    service.disconnect(a).await;

    assert_eq!(output.len().await, sent_before);
    assert!(service.registry().is_empty());
}
