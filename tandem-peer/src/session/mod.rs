mod broker_sink;
mod participant;

pub use broker_sink::*;
pub use participant::*;
