//! Wire model shared by the tandem broker and its peers.

pub mod model;

pub use model::*;
