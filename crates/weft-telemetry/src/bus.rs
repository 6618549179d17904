//! Event bus: queued event dispatch with pluggable sinks.
//!
//! Producers push into a `std::sync::mpsc` channel; nothing reaches a
//! sink until the owner calls [`EventBus::flush`], typically once per
//! frame after the sync phase. Producers on other threads get their own
//! [`EventEmitter`].

use std::sync::mpsc;

use crate::events::{EventKind, SimulationEvent};
use crate::sinks::EventSink;

/// Queued event bus for simulation telemetry.
pub struct EventBus {
    sender: mpsc::Sender<SimulationEvent>,
    receiver: mpsc::Receiver<SimulationEvent>,
    sinks: Vec<Box<dyn EventSink>>,
    /// A disabled bus drops events at `emit`.
    enabled: bool,
    dispatched: u64,
}

/// Cloneable producer handle for a bus.
#[derive(Clone)]
pub struct EventEmitter {
    sender: mpsc::Sender<SimulationEvent>,
}

impl EventEmitter {
    /// Queues an event; dropped if the bus is gone.
    pub fn emit(&self, event: SimulationEvent) {
        let _ = self.sender.send(event);
    }
}

impl EventBus {
    /// Creates a new event bus with no sinks.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            sinks: Vec::new(),
            enabled: true,
            dispatched: 0,
        }
    }

    /// Registers a sink to receive events.
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Enables or disables the bus.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Queues an event. No-op while disabled.
    pub fn emit(&self, event: SimulationEvent) {
        if !self.enabled {
            return;
        }
        // The receiver lives as long as `self`.
        let _ = self.sender.send(event);
    }

    /// Shorthand for `emit(SimulationEvent::new(frame, kind))`.
    pub fn record(&self, frame: u64, kind: EventKind) {
        self.emit(SimulationEvent::new(frame, kind));
    }

    /// A producer handle that bypasses the enabled flag.
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter {
            sender: self.sender.clone(),
        }
    }

    /// Dispatches every queued event to every sink, in emission order.
    pub fn flush(&mut self) {
        while let Ok(event) = self.receiver.try_recv() {
            for sink in &mut self.sinks {
                sink.handle(&event);
            }
            self.dispatched += 1;
        }
    }

    /// Total events dispatched so far.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Returns the number of registered sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Flushes pending events and finalizes every sink.
    pub fn shutdown(&mut self) {
        self.flush();
        for sink in &mut self.sinks {
            tracing::debug!(sink = sink.name(), "finalizing telemetry sink");
            sink.finalize();
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
