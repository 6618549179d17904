//! Integration tests for weft-telemetry.

use weft_telemetry::bus::EventBus;
use weft_telemetry::events::{EventKind, SimulationEvent};
use weft_telemetry::sinks::{EventSink, VecSink};

#[test]
fn emit_and_flush() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));

    bus.emit(SimulationEvent::new(0, EventKind::FrameBegin { dt: 0.016, solver_count: 2 }));
    bus.emit(SimulationEvent::new(0, EventKind::RenderSync { cloth_count: 3 }));
    assert!(sink.is_empty());

    bus.flush();
    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].kind, EventKind::RenderSync { cloth_count: 3 });
}

#[test]
fn disabled_bus_drops_events() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));
    bus.set_enabled(false);
    bus.emit(SimulationEvent::new(0, EventKind::DragEnd));
    bus.flush();
    assert!(sink.is_empty());
}

#[test]
fn multiple_sinks() {
    let mut bus = EventBus::new();
    let a = VecSink::new();
    let b = VecSink::new();
    bus.add_sink(Box::new(a.clone()));
    bus.add_sink(Box::new(b.clone()));
    assert_eq!(bus.sink_count(), 2);

    bus.emit(SimulationEvent::new(4, EventKind::DragEnd));
    bus.shutdown();
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 1);
}

#[test]
fn finalize_called_on_shutdown() {
    struct Flag(std::sync::Arc<std::sync::atomic::AtomicBool>);
    impl EventSink for Flag {
        fn handle(&mut self, _event: &SimulationEvent) {}
        fn finalize(&mut self) {
            self.0.store(true, std::sync::atomic::Ordering::SeqCst);
        }
        fn name(&self) -> &str {
            "flag"
        }
    }

    let done = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let mut bus = EventBus::new();
    bus.add_sink(Box::new(Flag(done.clone())));
    bus.shutdown();
    assert!(done.load(std::sync::atomic::Ordering::SeqCst));
}

#[test]
fn event_serialization() {
    let event = SimulationEvent::new(
        5,
        EventKind::StepComplete {
            wall_time: 0.002,
            failed: 0,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    let recovered: SimulationEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, event);
}

#[test]
fn drag_event_names_particle() {
    let event = SimulationEvent::new(
        10,
        EventKind::DragBegin {
            particle: 7,
            distance: 3.5,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("DragBegin"));
    assert!(json.contains("\"particle\":7"));
}

#[test]
fn emitter_sends_from_another_thread() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));

    let emitter = bus.emitter();
    std::thread::spawn(move || emitter.emit(SimulationEvent::new(1, EventKind::DragEnd)))
        .join()
        .unwrap();
    bus.record(2, EventKind::RenderSync { cloth_count: 0 });
    bus.flush();

    assert_eq!(bus.dispatched(), 2);
    let frames: Vec<u64> = sink.events().iter().map(|e| e.frame).collect();
    assert_eq!(frames, vec![1, 2]);
}
