mod negotiator;
mod phase;
mod signal_sink;
mod transition;

pub use negotiator::*;
pub use phase::*;
pub use signal_sink::*;
pub use transition::*;
