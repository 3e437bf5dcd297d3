use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the pair creates the first offer.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Initiator,
    Receiver,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Initiator => write!(f, "initiator"),
            Role::Receiver => write!(f, "receiver"),
        }
    }
}
