//! Resolution of settled press records into actions

use core::fmt::Debug;

use crate::event::{elapsed, Millis};
use crate::registry::Press;
use crate::tracker::PressTracker;

/// Timing thresholds; zero disables the corresponding path
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Thresholds {
    pub short_press_ms: Millis,
    pub long_press_ms: Millis,
}

impl Thresholds {
    /// `Some(long)` once a record's timing has stabilized at `now`
    ///
    /// Long press is checked first: an input still held past the long
    /// threshold resolves long whatever its press count.
    fn classify(&self, pressed_at: Option<Millis>, released_at: Option<Millis>, now: Millis) -> Option<bool> {
        match (pressed_at, released_at) {
            (Some(pressed_at), None) => {
                (self.long_press_ms > 0 && elapsed(now, pressed_at) > self.long_press_ms)
                    .then_some(true)
            }
            (Some(_), Some(released_at)) => {
                (self.short_press_ms > 0 && elapsed(now, released_at) > self.short_press_ms)
                    .then_some(false)
            }
            _ => None,
        }
    }
}

/// Finalize the first settled record, if any
///
/// At most one record is resolved per call so a handler gets the chance to
/// rebind keys before the next action is produced.
pub(crate) fn resolve<I>(tracker: &mut PressTracker<I>, thresholds: Thresholds, now: Millis) -> Option<Press<I>>
where
    I: Copy + Ord + Debug,
{
    let (slot, long) = tracker
        .records()
        .iter()
        .enumerate()
        .find_map(|(slot, record)| {
            thresholds
                .classify(record.pressed_at, record.released_at, now)
                .map(|long| (slot, long))
        })?;

    let record = tracker.remove_at(slot);
    let press = Press {
        input: record.input,
        presses: record.presses,
        long,
    };
    if long {
        log::debug!("Long press detected: {:?}", press);
    } else {
        log::debug!("Short press detected: {:?}", press);
    }
    Some(press)
}
