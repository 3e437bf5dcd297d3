use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_ROOM: &str = "default-room";

/// Externally supplied room name.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Uses `requested` unless it is missing or blank, in which case `fallback` wins.
    pub fn or_default(requested: Option<&str>, fallback: &RoomId) -> Self {
        match requested.map(str::trim) {
            Some(id) if !id.is_empty() => Self(id.to_owned()),
            _ => fallback.clone(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self(DEFAULT_ROOM.to_owned())
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
