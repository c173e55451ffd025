//! Multi-touch gesture recognition engine for a host touch surface.
//!
//! Raw pointer frames go in through [`GestureEngine::ingest`]; classified
//! gestures (tap, double-tap, long-press, swipe, pinch, rotate) come out
//! through observers registered on the engine. Classification is synchronous
//! and single-threaded; time is injected with every call, so the state
//! machines are deterministic under test.

mod config;
mod dispatch;
mod engine;
mod history;
mod ingest;
mod multi;
mod single;
mod types;

pub use config::{GestureConfig, MultiContactConfig, SingleContactConfig};
pub use dispatch::{GestureDispatcher, GestureFilter, ObserverId};
pub use engine::GestureEngine;
pub use types::{
    ContactFrame, ContactSample, Gesture, GestureEvent, GestureKind, RawContact, SwipeDirection,
    TouchPhase, MAX_CONTACTS,
};
