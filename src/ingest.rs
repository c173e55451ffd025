use log::debug;

use crate::types::{ContactFrame, ContactSample, RawContact, MAX_CONTACTS};

/// Builds a validated frame from a raw host notification. Malformed contacts
/// are dropped here so the classifiers only ever see well-formed samples;
/// the second value counts the drops.
pub(crate) fn build_frame(now_ms: u64, contacts: &[RawContact]) -> (ContactFrame, u8) {
    let mut frame = ContactFrame {
        t_ms: now_ms,
        ..Default::default()
    };
    let mut slot = 0usize;
    let mut dropped = 0u8;

    for raw in contacts {
        let Some(id) = raw.id else {
            debug!(
                "gesture: drop_contact reason=missing_id x={} y={}",
                raw.x, raw.y
            );
            dropped = dropped.saturating_add(1);
            continue;
        };
        if !raw.x.is_finite() || !raw.y.is_finite() {
            debug!("gesture: drop_contact reason=non_finite id={}", id);
            dropped = dropped.saturating_add(1);
            continue;
        }
        if frame.iter().any(|contact| contact.id == id) {
            debug!("gesture: drop_contact reason=duplicate_id id={}", id);
            dropped = dropped.saturating_add(1);
            continue;
        }
        if slot >= MAX_CONTACTS {
            debug!("gesture: drop_contact reason=overflow id={}", id);
            dropped = dropped.saturating_add(1);
            continue;
        }
        frame.contacts[slot] = Some(ContactSample {
            id,
            x: raw.x,
            y: raw.y,
            t_ms: now_ms,
        });
        slot += 1;
    }

    frame.contact_count = slot as u8;
    (frame, dropped)
}
