use std::cell::RefCell;
use std::rc::Rc;

use gesture_engine::{
    Gesture, GestureEngine, GestureEvent, GestureFilter, GestureKind, RawContact, SwipeDirection,
    TouchPhase,
};

struct Step {
    at_ms: u64,
    phase: TouchPhase,
    contacts: Vec<RawContact>,
}

fn step(at_ms: u64, phase: TouchPhase, contacts: &[(u32, f32, f32)]) -> Step {
    Step {
        at_ms,
        phase,
        contacts: contacts
            .iter()
            .map(|&(id, x, y)| RawContact {
                id: Some(id),
                x,
                y,
            })
            .collect(),
    }
}

/// Replays a scripted frame sequence the way a host surface would deliver
/// it, arming the long-press wakeup from `next_deadline_ms` between frames.
fn replay(engine: &mut GestureEngine, steps: &[Step]) {
    for s in steps {
        if let Some(deadline) = engine.next_deadline_ms() {
            if deadline <= s.at_ms {
                engine.poll(deadline);
            }
        }
        engine.ingest(s.at_ms, s.phase, &s.contacts);
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

fn kinds(received: &Rc<RefCell<Vec<GestureEvent>>>) -> Vec<GestureKind> {
    received.borrow().iter().map(GestureEvent::kind).collect()
}

#[test]
fn tap_double_tap_swipe_session() {
    let mut engine = GestureEngine::new();
    let received = recorder(&mut engine);

    let script = [
        // First tap.
        step(0, TouchPhase::Down, &[(1, 100.0, 100.0)]),
        step(30, TouchPhase::Move, &[(1, 101.0, 100.0)]),
        step(80, TouchPhase::Up, &[]),
        // Second tap inside the double-tap window.
        step(160, TouchPhase::Down, &[(1, 102.0, 101.0)]),
        step(220, TouchPhase::Up, &[]),
        // A fast rightward stroke.
        step(600, TouchPhase::Down, &[(2, 50.0, 200.0)]),
        step(650, TouchPhase::Move, &[(2, 80.0, 202.0)]),
        step(720, TouchPhase::Move, &[(2, 140.0, 203.0)]),
        step(760, TouchPhase::Up, &[]),
    ];
    replay(&mut engine, &script);

    assert_eq!(
        kinds(&received),
        vec![GestureKind::Tap, GestureKind::DoubleTap, GestureKind::Swipe]
    );
    let events = received.borrow();
    let Gesture::Swipe {
        direction,
        distance_px,
        velocity_px_per_ms,
    } = events[2].gesture
    else {
        panic!("expected swipe, got {:?}", events[2].gesture);
    };
    assert_eq!(direction, SwipeDirection::Right);
    assert!(distance_px >= 50.0);
    assert!(velocity_px_per_ms > 0.0);
}

#[test]
fn stationary_hold_resolves_to_long_press_via_scheduler() {
    let mut engine = GestureEngine::new();
    let received = recorder(&mut engine);

    let script = [
        step(0, TouchPhase::Down, &[(1, 300.0, 300.0)]),
        step(120, TouchPhase::Move, &[(1, 302.0, 300.0)]),
        // Host wakeup fires from next_deadline_ms before this late frame.
        step(900, TouchPhase::Up, &[]),
    ];
    replay(&mut engine, &script);

    assert_eq!(kinds(&received), vec![GestureKind::LongPress]);
    assert_eq!(received.borrow()[0].duration_ms, 500);
    assert_eq!(engine.next_deadline_ms(), None);
}

#[test]
fn pinch_session_does_not_leak_a_tap() {
    let mut engine = GestureEngine::new();
    let received = recorder(&mut engine);

    let script = [
        step(0, TouchPhase::Down, &[(1, 100.0, 100.0)]),
        step(
            40,
            TouchPhase::Down,
            &[(1, 100.0, 100.0), (2, 200.0, 100.0)],
        ),
        step(
            120,
            TouchPhase::Move,
            &[(1, 60.0, 100.0), (2, 240.0, 100.0)],
        ),
        // One finger lifts, the other follows shortly after: no tap.
        step(180, TouchPhase::Up, &[(1, 60.0, 100.0)]),
        step(260, TouchPhase::Up, &[]),
    ];
    replay(&mut engine, &script);

    assert_eq!(kinds(&received), vec![GestureKind::Pinch]);
    let events = received.borrow();
    let Gesture::Pinch { scale, .. } = events[0].gesture else {
        panic!("expected pinch, got {:?}", events[0].gesture);
    };
    assert!((scale - 1.8).abs() < 1e-6);
    assert_eq!(events[0].points[0].map(|p| p.id), Some(1));
    assert_eq!(events[0].points[1].map(|p| p.id), Some(2));
}

#[test]
fn destroy_mid_interaction_goes_silent() {
    let mut engine = GestureEngine::new();
    let received = recorder(&mut engine);

    engine.ingest(0, TouchPhase::Down, &[RawContact {
        id: Some(1),
        x: 100.0,
        y: 100.0,
    }]);
    assert!(engine.next_deadline_ms().is_some());
    engine.destroy();

    let script = [
        step(700, TouchPhase::Down, &[(1, 100.0, 100.0)]),
        step(780, TouchPhase::Up, &[]),
    ];
    replay(&mut engine, &script);

    assert!(received.borrow().is_empty());
    assert_eq!(engine.next_deadline_ms(), None);
}
