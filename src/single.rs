use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use crate::config::SingleContactConfig;
use crate::types::{ContactFrame, ContactSample, EmitBuffer, Gesture, GestureEvent, SwipeDirection};

#[derive(Clone, Copy, Debug)]
pub(crate) enum PointerEvent {
    Frame { frame: ContactFrame },
    Poll { now_ms: u64 },
    Cancel,
}

/// Release point and time of the most recent tap, kept alive across
/// interactions for the duration of the double-tap window.
#[derive(Clone, Copy, Debug)]
struct TapMemory {
    x: f32,
    y: f32,
    t_ms: u64,
}

pub(crate) struct SingleContactEngine {
    machine: statig::blocking::StateMachine<SingleHsm>,
}

impl SingleContactEngine {
    pub(crate) fn new(config: SingleContactConfig) -> Self {
        Self {
            machine: SingleHsm::new(config).state_machine(),
        }
    }

    pub(crate) fn handle(&mut self, event: &PointerEvent, context: &mut EmitBuffer) {
        self.machine.handle_with_context(event, context);
    }

    /// Armed long-press deadline, if any. The host schedules one wakeup for
    /// it and delivers expiry through `PointerEvent::Poll`.
    pub(crate) fn next_deadline_ms(&self) -> Option<u64> {
        self.machine.inner().long_press_deadline
    }
}

struct SingleHsm {
    config: SingleContactConfig,
    down: ContactSample,
    last_point: ContactSample,
    long_press_deadline: Option<u64>,
    swipe_fired: bool,
    last_tap: Option<TapMemory>,
}

impl SingleHsm {
    fn new(config: SingleContactConfig) -> Self {
        Self {
            config,
            down: ContactSample::default(),
            last_point: ContactSample::default(),
            long_press_deadline: None,
            swipe_fired: false,
            last_tap: None,
        }
    }

    fn begin_press(&mut self, sample: ContactSample) {
        self.down = sample;
        self.last_point = sample;
        self.long_press_deadline = Some(sample.t_ms.saturating_add(self.config.long_press_ms));
        self.swipe_fired = false;
    }

    fn reset_interaction(&mut self) {
        self.long_press_deadline = None;
        self.swipe_fired = false;
    }

    fn clear_all(&mut self) {
        self.reset_interaction();
        self.last_tap = None;
    }

    fn distance_from_down(&self, point: ContactSample) -> f32 {
        (point.x - self.down.x).hypot(point.y - self.down.y)
    }

    fn deadline_due(&self, now_ms: u64) -> bool {
        self.long_press_deadline
            .is_some_and(|deadline| now_ms >= deadline)
    }

    fn emit(&self, context: &mut EmitBuffer, gesture: Gesture, now_ms: u64, point: ContactSample) {
        context.push(GestureEvent {
            gesture,
            start_ms: self.down.t_ms,
            duration_ms: now_ms.saturating_sub(self.down.t_ms),
            points: [Some(point), None],
        });
    }

    fn classify_swipe(&self, now_ms: u64, point: ContactSample) -> Option<Gesture> {
        let elapsed = now_ms.saturating_sub(self.down.t_ms);
        if elapsed >= self.config.swipe_max_duration_ms {
            return None;
        }
        let dx = point.x - self.down.x;
        let dy = point.y - self.down.y;
        let distance = dx.hypot(dy);
        if distance < self.config.swipe_min_distance_px {
            return None;
        }
        // Dominant axis wins; an exact tie resolves to horizontal.
        let direction = if dx.abs() >= dy.abs() {
            if dx >= 0.0 {
                SwipeDirection::Right
            } else {
                SwipeDirection::Left
            }
        } else if dy >= 0.0 {
            SwipeDirection::Down
        } else {
            SwipeDirection::Up
        };
        Some(Gesture::Swipe {
            direction,
            distance_px: distance,
            velocity_px_per_ms: distance / elapsed.max(1) as f32,
        })
    }

    /// Release out of the pressed state: the contact never left the jitter
    /// radius, so the interaction resolves to long-press (deadline already
    /// passed), double-tap, tap, or nothing.
    fn finalize_release(&mut self, context: &mut EmitBuffer, now_ms: u64) {
        let release = self.last_point;
        let duration = now_ms.saturating_sub(self.down.t_ms);

        if self.deadline_due(now_ms) {
            // Expiry was only observed at release; the hold still satisfied
            // the full delay.
            self.emit(context, Gesture::LongPress, now_ms, release);
            self.reset_interaction();
            return;
        }

        if duration >= self.config.tap_max_duration_ms {
            self.reset_interaction();
            return;
        }

        if let Some(last) = self.last_tap {
            let gap = now_ms.saturating_sub(last.t_ms);
            let spread = (release.x - last.x).hypot(release.y - last.y);
            if gap <= self.config.double_tap_window_ms && spread < self.config.double_tap_radius_px
            {
                self.emit(context, Gesture::DoubleTap, now_ms, release);
                // A third tap must not chain into another double-tap.
                self.last_tap = None;
                self.reset_interaction();
                return;
            }
        }

        self.emit(context, Gesture::Tap, now_ms, release);
        self.last_tap = Some(TapMemory {
            x: release.x,
            y: release.y,
            t_ms: now_ms,
        });
        self.reset_interaction();
    }
}

#[state_machine(initial = "State::idle()")]
impl SingleHsm {
    #[state]
    fn idle(&mut self, context: &mut EmitBuffer, event: &PointerEvent) -> Outcome<State> {
        let _ = context;
        match event {
            PointerEvent::Frame { frame } => match frame.contact_count {
                0 => Handled,
                1 => {
                    if let Some(point) = frame.primary() {
                        self.begin_press(point);
                        return Transition(State::pressed());
                    }
                    Handled
                }
                _ => Transition(State::suppressed()),
            },
            PointerEvent::Poll { .. } => Handled,
            PointerEvent::Cancel => {
                self.clear_all();
                Handled
            }
        }
    }

    #[state]
    fn pressed(&mut self, context: &mut EmitBuffer, event: &PointerEvent) -> Outcome<State> {
        match event {
            PointerEvent::Frame { frame } => match frame.contact_count {
                0 => {
                    self.finalize_release(context, frame.t_ms);
                    Transition(State::idle())
                }
                1 => {
                    let Some(point) = frame.find(self.down.id) else {
                        // The tracked contact vanished and a new one appeared
                        // in the same frame; restart from the new contact.
                        if let Some(point) = frame.primary() {
                            self.begin_press(point);
                        }
                        return Handled;
                    };
                    self.last_point = point;

                    if self.distance_from_down(point) > self.config.jitter_px {
                        // No longer a tap or long-press candidate.
                        self.long_press_deadline = None;
                        if let Some(swipe) = self.classify_swipe(frame.t_ms, point) {
                            self.swipe_fired = true;
                            self.emit(context, swipe, frame.t_ms, point);
                        }
                        return Transition(State::dragging());
                    }

                    if self.deadline_due(frame.t_ms) {
                        self.long_press_deadline = None;
                        self.emit(context, Gesture::LongPress, frame.t_ms, point);
                        return Transition(State::long_pressed());
                    }

                    Handled
                }
                _ => {
                    self.reset_interaction();
                    Transition(State::suppressed())
                }
            },
            PointerEvent::Poll { now_ms } => {
                if self.deadline_due(*now_ms) {
                    self.long_press_deadline = None;
                    self.emit(context, Gesture::LongPress, *now_ms, self.last_point);
                    return Transition(State::long_pressed());
                }
                Handled
            }
            PointerEvent::Cancel => {
                self.clear_all();
                Transition(State::idle())
            }
        }
    }

    #[state]
    fn dragging(&mut self, context: &mut EmitBuffer, event: &PointerEvent) -> Outcome<State> {
        match event {
            PointerEvent::Frame { frame } => match frame.contact_count {
                0 => {
                    // Moved past jitter: the release resolves to nothing.
                    self.reset_interaction();
                    Transition(State::idle())
                }
                1 => {
                    let Some(point) = frame.find(self.down.id) else {
                        if let Some(point) = frame.primary() {
                            self.begin_press(point);
                            return Transition(State::pressed());
                        }
                        return Handled;
                    };
                    self.last_point = point;
                    if !self.swipe_fired {
                        if let Some(swipe) = self.classify_swipe(frame.t_ms, point) {
                            self.swipe_fired = true;
                            self.emit(context, swipe, frame.t_ms, point);
                        }
                    }
                    Handled
                }
                _ => {
                    self.reset_interaction();
                    Transition(State::suppressed())
                }
            },
            PointerEvent::Poll { .. } => Handled,
            PointerEvent::Cancel => {
                self.clear_all();
                Transition(State::idle())
            }
        }
    }

    #[state]
    fn long_pressed(&mut self, context: &mut EmitBuffer, event: &PointerEvent) -> Outcome<State> {
        let _ = context;
        match event {
            PointerEvent::Frame { frame } => match frame.contact_count {
                0 => {
                    // Long-press is terminal for the interaction.
                    self.reset_interaction();
                    Transition(State::idle())
                }
                1 => {
                    if let Some(point) = frame.find(self.down.id) {
                        self.last_point = point;
                    }
                    Handled
                }
                _ => Transition(State::suppressed()),
            },
            PointerEvent::Poll { .. } => Handled,
            PointerEvent::Cancel => {
                self.clear_all();
                Transition(State::idle())
            }
        }
    }

    /// More than one contact is down, or was down earlier in this
    /// interaction. A surviving contact must not re-arm tap or long-press;
    /// classification resumes only after every contact lifts.
    #[state]
    fn suppressed(&mut self, context: &mut EmitBuffer, event: &PointerEvent) -> Outcome<State> {
        let _ = context;
        match event {
            PointerEvent::Frame { frame } => {
                if frame.contact_count == 0 {
                    Transition(State::idle())
                } else {
                    Handled
                }
            }
            PointerEvent::Poll { .. } => Handled,
            PointerEvent::Cancel => {
                self.clear_all();
                Transition(State::idle())
            }
        }
    }
}
