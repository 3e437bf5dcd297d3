mod role_assignor;
mod room;
mod room_table;

pub(crate) use room::Room;
pub use room_table::*;
