//! Initiator selection. Strictly by join order so both peers converge on the
//! same answer without another negotiation round.

use crate::room::Room;
use tandem_core::{ConnectionId, Role};

/// Appends `joiner` to `room` and returns its role. The first member of an
/// empty room becomes the initiator.
pub(crate) fn assign_on_join(room: &mut Room, joiner: ConnectionId) -> Role {
    let role = if room.is_empty() {
        room.initiator = Some(joiner);
        Role::Initiator
    } else {
        debug_assert!(room.initiator.is_some(), "non-empty room without initiator");
        Role::Receiver
    };
    room.members.push(joiner);
    role
}

/// Call after `departed` has been removed from `room`. If it held the
/// initiator role, hands the role to the earliest-joined survivor and returns
/// that survivor.
pub(crate) fn promote_after_leave(room: &mut Room, departed: &ConnectionId) -> Option<ConnectionId> {
    if room.initiator.as_ref() != Some(departed) {
        return None;
    }
    room.initiator = room.members.first().copied();
    room.initiator
}
