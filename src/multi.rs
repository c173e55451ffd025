use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use crate::config::MultiContactConfig;
use crate::types::{ContactFrame, ContactSample, EmitBuffer, Gesture, GestureEvent};

// Two contacts reported closer than this cannot anchor scale math; the
// baseline retries on the next two-contact frame.
const MIN_BASELINE_DISTANCE_PX: f32 = 1.0;

#[derive(Clone, Copy, Debug)]
pub(crate) enum PairEvent {
    Frame { frame: ContactFrame },
    Cancel,
}

/// Geometry captured the instant the second contact touched down. Reference
/// for every scale/rotation delta of the interaction.
#[derive(Clone, Copy, Debug)]
struct PairBaseline {
    first_id: u32,
    second_id: u32,
    distance_px: f32,
    angle_deg: f32,
    start_ms: u64,
}

pub(crate) struct MultiContactEngine {
    machine: statig::blocking::StateMachine<MultiHsm>,
}

impl MultiContactEngine {
    pub(crate) fn new(config: MultiContactConfig) -> Self {
        Self {
            machine: MultiHsm::new(config).state_machine(),
        }
    }

    pub(crate) fn handle(&mut self, event: &PairEvent, context: &mut EmitBuffer) {
        self.machine.handle_with_context(event, context);
    }
}

struct MultiHsm {
    config: MultiContactConfig,
    baseline: Option<PairBaseline>,
}

impl MultiHsm {
    fn new(config: MultiContactConfig) -> Self {
        Self {
            config,
            baseline: None,
        }
    }

    fn arm_baseline(&mut self, frame: &ContactFrame) -> bool {
        let Some((a, b)) = frame.pair() else {
            return false;
        };
        let distance = pair_distance(a, b);
        if distance < MIN_BASELINE_DISTANCE_PX {
            return false;
        }
        self.baseline = Some(PairBaseline {
            first_id: a.id,
            second_id: b.id,
            distance_px: distance,
            angle_deg: pair_angle_deg(a, b),
            start_ms: frame.t_ms,
        });
        true
    }

    fn emit_pair(
        &self,
        context: &mut EmitBuffer,
        gesture: Gesture,
        now_ms: u64,
        baseline: PairBaseline,
        a: ContactSample,
        b: ContactSample,
    ) {
        context.push(GestureEvent {
            gesture,
            start_ms: baseline.start_ms,
            duration_ms: now_ms.saturating_sub(baseline.start_ms),
            points: [Some(a), Some(b)],
        });
    }

    fn classify_pair(&mut self, context: &mut EmitBuffer, frame: &ContactFrame) {
        let Some(baseline) = self.baseline else {
            return;
        };
        let (Some(a), Some(b)) = (frame.find(baseline.first_id), frame.find(baseline.second_id))
        else {
            // Same count, different fingers: the old geometry is meaningless.
            self.baseline = None;
            self.arm_baseline(frame);
            return;
        };

        let scale = pair_distance(a, b) / baseline.distance_px;
        let rotation_deg = wrap_degrees(pair_angle_deg(a, b) - baseline.angle_deg);

        // Scale and rotation are judged independently; one move frame may
        // report both a pinch and a rotate.
        if (scale - 1.0).abs() >= self.config.pinch_scale_threshold {
            self.emit_pair(
                context,
                Gesture::Pinch {
                    scale,
                    rotation_deg,
                },
                frame.t_ms,
                baseline,
                a,
                b,
            );
        }
        if rotation_deg.abs() >= self.config.rotate_threshold_deg {
            self.emit_pair(
                context,
                Gesture::Rotate {
                    scale,
                    rotation_deg,
                },
                frame.t_ms,
                baseline,
                a,
                b,
            );
        }
    }
}

#[state_machine(initial = "State::no_baseline()")]
impl MultiHsm {
    #[state]
    fn no_baseline(&mut self, context: &mut EmitBuffer, event: &PairEvent) -> Outcome<State> {
        let _ = context;
        match event {
            PairEvent::Frame { frame } => {
                if frame.contact_count == 2 && self.arm_baseline(frame) {
                    return Transition(State::tracking());
                }
                Handled
            }
            PairEvent::Cancel => {
                self.baseline = None;
                Handled
            }
        }
    }

    #[state]
    fn tracking(&mut self, context: &mut EmitBuffer, event: &PairEvent) -> Outcome<State> {
        match event {
            PairEvent::Frame { frame } => {
                if frame.contact_count != 2 {
                    self.baseline = None;
                    return Transition(State::no_baseline());
                }
                self.classify_pair(context, frame);
                if self.baseline.is_none() {
                    // Re-baseline after a pair swap failed (degenerate frame).
                    return Transition(State::no_baseline());
                }
                Handled
            }
            PairEvent::Cancel => {
                self.baseline = None;
                Transition(State::no_baseline())
            }
        }
    }
}

fn pair_distance(a: ContactSample, b: ContactSample) -> f32 {
    (b.x - a.x).hypot(b.y - a.y)
}

fn pair_angle_deg(a: ContactSample, b: ContactSample) -> f32 {
    (b.y - a.y).atan2(b.x - a.x).to_degrees()
}

fn wrap_degrees(mut deg: f32) -> f32 {
    while deg > 180.0 {
        deg -= 360.0;
    }
    while deg <= -180.0 {
        deg += 360.0;
    }
    deg
}
