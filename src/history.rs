use heapless::Deque;

use crate::types::ContactFrame;

/// Frames retained for delta computation. Oldest dropped past this bound.
pub(crate) const HISTORY_FRAMES: usize = 10;

/// Per-contact displacement between the two most recent frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ContactDelta {
    pub(crate) dx: f32,
    pub(crate) dy: f32,
    pub(crate) dt_ms: u64,
}

/// Bounded window of recent frames. Owned exclusively by the engine; the
/// classifiers read deltas from here instead of re-reading hardware events.
#[derive(Default)]
pub(crate) struct FrameHistory {
    frames: Deque<ContactFrame, HISTORY_FRAMES>,
}

impl FrameHistory {
    pub(crate) fn push(&mut self, frame: ContactFrame) {
        if self.frames.is_full() {
            self.frames.pop_front();
        }
        let _ = self.frames.push_back(frame);
    }

    pub(crate) fn latest(&self) -> Option<&ContactFrame> {
        self.frames.back()
    }

    pub(crate) fn previous(&self) -> Option<&ContactFrame> {
        let len = self.frames.len();
        if len < 2 {
            return None;
        }
        self.frames.iter().nth(len - 2)
    }

    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn clear(&mut self) {
        self.frames.clear();
    }

    /// Displacement of one contact across the two newest frames. `None` when
    /// the contact is absent from either frame.
    pub(crate) fn contact_delta(&self, id: u32) -> Option<ContactDelta> {
        let current = self.latest()?.find(id)?;
        let previous = self.previous()?.find(id)?;
        Some(ContactDelta {
            dx: current.x - previous.x,
            dy: current.y - previous.y,
            dt_ms: current.t_ms.saturating_sub(previous.t_ms),
        })
    }
}
