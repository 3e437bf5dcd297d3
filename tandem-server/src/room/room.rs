use tandem_core::{ConnectionId, Role};

/// Members of one room in join order, plus the current initiator.
#[derive(Debug, Default, Clone)]
pub(crate) struct Room {
    pub(crate) members: Vec<ConnectionId>,
    pub(crate) initiator: Option<ConnectionId>,
}

impl Room {
    pub(crate) fn contains(&self, id: &ConnectionId) -> bool {
        self.members.contains(id)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }

    pub(crate) fn role_of(&self, id: &ConnectionId) -> Option<Role> {
        if !self.contains(id) {
            return None;
        }
        if self.initiator.as_ref() == Some(id) {
            Some(Role::Initiator)
        } else {
            Some(Role::Receiver)
        }
    }

    /// Everyone except `id`, in join order.
    pub(crate) fn others(&self, id: &ConnectionId) -> Vec<ConnectionId> {
        self.members.iter().filter(|m| *m != id).copied().collect()
    }

    /// Removes `id`. Returns false if it was not a member.
    pub(crate) fn remove(&mut self, id: &ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != id);
        before != self.members.len()
    }
}
