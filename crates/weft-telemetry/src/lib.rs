//! # weft-telemetry
//!
//! Event bus for frame telemetry. The simulation controller emits one
//! structured event per frame phase (start, wait, sync) and per drag
//! transition; pluggable sinks consume them.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::{EventBus, EventEmitter};
pub use events::{EventKind, SimulationEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
