use log::{debug, trace};

use crate::config::GestureConfig;
use crate::dispatch::{GestureDispatcher, GestureFilter, ObserverId};
use crate::history::FrameHistory;
use crate::ingest;
use crate::multi::{MultiContactEngine, PairEvent};
use crate::single::{PointerEvent, SingleContactEngine};
use crate::types::{EmitBuffer, GestureEvent, RawContact, TouchPhase};

/// The full pipeline: ingest -> history -> classifiers -> dispatcher.
/// Single-threaded and synchronous; every call completes before returning,
/// and time only enters through the `now_ms` arguments.
pub struct GestureEngine {
    config: GestureConfig,
    history: FrameHistory,
    single: SingleContactEngine,
    multi: MultiContactEngine,
    dispatcher: GestureDispatcher,
    dropped_contacts: u64,
    destroyed: bool,
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureEngine {
    pub fn new() -> Self {
        Self::with_config(GestureConfig::default())
    }

    pub fn with_config(config: GestureConfig) -> Self {
        Self {
            config,
            history: FrameHistory::default(),
            single: SingleContactEngine::new(config.single),
            multi: MultiContactEngine::new(config.multi),
            dispatcher: GestureDispatcher::new(),
            dropped_contacts: 0,
            destroyed: false,
        }
    }

    /// Feeds one hardware notification through the pipeline. Infallible:
    /// malformed contacts are dropped, observer failures are isolated, and
    /// nothing escapes to the host's event loop.
    pub fn ingest(&mut self, now_ms: u64, phase: TouchPhase, contacts: &[RawContact]) {
        if self.destroyed {
            return;
        }
        if phase == TouchPhase::Cancel {
            debug!("gesture: cancel contacts={}", contacts.len());
            self.cancel_all();
            return;
        }

        let (frame, dropped) = ingest::build_frame(now_ms, contacts);
        if dropped > 0 {
            self.dropped_contacts += u64::from(dropped);
        }
        self.history.push(frame);
        if let Some(delta) = frame
            .primary()
            .and_then(|contact| self.history.contact_delta(contact.id))
        {
            trace!(
                "gesture: frame phase={:?} contacts={} dx={:.1} dy={:.1} dt_ms={}",
                phase,
                frame.contact_count,
                delta.dx,
                delta.dy,
                delta.dt_ms
            );
        }

        let mut emitted = EmitBuffer::default();
        self.single
            .handle(&PointerEvent::Frame { frame }, &mut emitted);
        self.multi.handle(&PairEvent::Frame { frame }, &mut emitted);

        if frame.contact_count == 0 {
            // Interaction over; retained frames age out with it.
            self.history.clear();
        }
        self.flush(&emitted);
    }

    /// Delivers long-press deadline expiry when no hardware frame arrives.
    /// Hosts arm one wakeup from `next_deadline_ms` and call this.
    pub fn poll(&mut self, now_ms: u64) {
        if self.destroyed {
            return;
        }
        let mut emitted = EmitBuffer::default();
        self.single.handle(&PointerEvent::Poll { now_ms }, &mut emitted);
        self.flush(&emitted);
    }

    pub fn next_deadline_ms(&self) -> Option<u64> {
        if self.destroyed {
            return None;
        }
        self.single.next_deadline_ms()
    }

    pub fn register(
        &mut self,
        filter: GestureFilter,
        callback: impl FnMut(&GestureEvent) + 'static,
    ) -> ObserverId {
        self.dispatcher.register(filter, callback)
    }

    pub fn unregister(&mut self, id: ObserverId) -> bool {
        self.dispatcher.unregister(id)
    }

    /// Deterministic teardown: no timer stays armed, no state survives, no
    /// observer remains registered. Further ingest/poll calls are ignored.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.cancel_all();
        self.dispatcher.clear();
        self.destroyed = true;
        debug!("gesture: destroyed");
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Malformed contacts dropped at ingest since construction.
    pub fn dropped_contacts(&self) -> u64 {
        self.dropped_contacts
    }

    fn cancel_all(&mut self) {
        // Cancel emits nothing by contract; the buffer only enforces it.
        let mut emitted = EmitBuffer::default();
        self.single.handle(&PointerEvent::Cancel, &mut emitted);
        self.multi.handle(&PairEvent::Cancel, &mut emitted);
        debug_assert!(emitted.is_empty());
        self.history.clear();
    }

    fn flush(&mut self, emitted: &EmitBuffer) {
        for event in emitted.iter() {
            debug!(
                "gesture: emit kind={:?} start_ms={} duration_ms={} observers={}",
                event.kind(),
                event.start_ms,
                event.duration_ms,
                self.dispatcher.observer_count()
            );
            self.dispatcher.dispatch(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Gesture, GestureKind};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn raw(id: u32, x: f32, y: f32) -> RawContact {
        RawContact {
            id: Some(id),
            x,
            y,
        }
    }

    fn recorder(engine: &mut GestureEngine) -> Rc<RefCell<Vec<GestureEvent>>> {
        let received: Rc<RefCell<Vec<GestureEvent>>> = Rc::default();
        let seen = received.clone();
        engine.register(GestureFilter::Any, move |event| {
            seen.borrow_mut().push(*event)
        });
        received
    }

    fn tap(engine: &mut GestureEngine, down_ms: u64, x: f32, y: f32) {
        engine.ingest(down_ms, TouchPhase::Down, &[raw(1, x, y)]);
        engine.ingest(down_ms + 80, TouchPhase::Up, &[]);
    }

    #[test]
    fn tap_reaches_registered_observer() {
        let mut engine = GestureEngine::new();
        let received = recorder(&mut engine);

        tap(&mut engine, 0, 100.0, 100.0);
        assert_eq!(received.borrow().len(), 1);
        assert_eq!(received.borrow()[0].kind(), GestureKind::Tap);
    }

    #[test]
    fn malformed_contact_does_not_disturb_classification() {
        let mut engine = GestureEngine::new();
        let received = recorder(&mut engine);

        // The id-less contact is dropped, so this is a single-contact frame
        // and still resolves to a tap.
        engine.ingest(
            0,
            TouchPhase::Down,
            &[
                raw(1, 100.0, 100.0),
                RawContact {
                    id: None,
                    x: 300.0,
                    y: 300.0,
                },
            ],
        );
        engine.ingest(90, TouchPhase::Up, &[]);

        assert_eq!(engine.dropped_contacts(), 1);
        assert_eq!(received.borrow().len(), 1);
        assert_eq!(received.borrow()[0].kind(), GestureKind::Tap);
    }

    #[test]
    fn cancel_phase_emits_nothing_and_clears_state() {
        let mut engine = GestureEngine::new();
        let received = recorder(&mut engine);

        engine.ingest(0, TouchPhase::Down, &[raw(1, 100.0, 100.0)]);
        assert_eq!(engine.next_deadline_ms(), Some(500));
        engine.ingest(40, TouchPhase::Cancel, &[]);

        assert_eq!(engine.next_deadline_ms(), None);
        engine.poll(600);
        assert!(received.borrow().is_empty());
    }

    #[test]
    fn pinch_flows_end_to_end() {
        let mut engine = GestureEngine::new();
        let received = recorder(&mut engine);

        engine.ingest(0, TouchPhase::Down, &[raw(1, 100.0, 100.0)]);
        engine.ingest(
            30,
            TouchPhase::Down,
            &[raw(1, 100.0, 100.0), raw(2, 200.0, 100.0)],
        );
        engine.ingest(
            120,
            TouchPhase::Move,
            &[raw(1, 50.0, 100.0), raw(2, 250.0, 100.0)],
        );
        engine.ingest(180, TouchPhase::Up, &[]);

        let events = received.borrow();
        assert_eq!(events.len(), 1);
        let Gesture::Pinch { scale, .. } = events[0].gesture else {
            panic!("expected pinch, got {:?}", events[0].gesture);
        };
        assert!((scale - 2.0).abs() < 1e-6);
    }

    #[test]
    fn destroy_silences_the_engine_and_disarms_timers() {
        let mut engine = GestureEngine::new();
        let received = recorder(&mut engine);

        engine.ingest(0, TouchPhase::Down, &[raw(1, 100.0, 100.0)]);
        assert_eq!(engine.next_deadline_ms(), Some(500));

        engine.destroy();
        assert_eq!(engine.next_deadline_ms(), None);

        engine.poll(600);
        engine.ingest(700, TouchPhase::Down, &[raw(1, 100.0, 100.0)]);
        engine.ingest(780, TouchPhase::Up, &[]);
        assert!(received.borrow().is_empty());
        assert_eq!(engine.next_deadline_ms(), None);
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut engine = GestureEngine::new();
        engine.destroy();
        engine.destroy();
        assert_eq!(engine.next_deadline_ms(), None);
    }
}
