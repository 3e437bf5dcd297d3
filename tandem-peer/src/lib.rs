//! Peer side of a tandem room: follows the role the broker assigns, runs
//! the offer/answer exchange and hands the open data channel to the caller.

mod client;
mod error;
mod event;
mod negotiation;
mod session;
mod transport;

pub use client::*;
pub use error::*;
pub use event::*;
pub use negotiation::*;
pub use session::*;
pub use transport::*;
