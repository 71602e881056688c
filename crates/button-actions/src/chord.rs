//! Chord detection
//!
//! Runs on every press edge, after the input joins the held set and before its
//! press is counted. When the exact held set is bound as a chord, every held
//! input is forgotten (records and held state) so none of them can later
//! resolve as a plain press.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::registry::{ActionKey, Handler, Registry};
use crate::tracker::PressTracker;

/// A chord whose binding matched the held set
pub(crate) struct FiredChord<I> {
    /// Held set at match time, sorted
    pub inputs: Vec<I>,
    pub handler: Handler<I>,
}

/// Match the held set against the registry and consume it on a hit
pub(crate) fn detect<I>(tracker: &mut PressTracker<I>, registry: &Registry<I>) -> Option<FiredChord<I>>
where
    I: Copy + Ord + Debug,
{
    if tracker.held().len() < 2 {
        return None;
    }

    // Held set is kept sorted, so it is already a canonical chord key
    let handler = registry.lookup(&ActionKey::Chord(tracker.held().to_vec()))?;
    let inputs = tracker.take_held();
    log::debug!("Chord detected: {:?}", inputs);

    Some(FiredChord { inputs, handler })
}
