//! Per-input press bookkeeping

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::event::Millis;

/// Unresolved press history of one input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PressRecord<I> {
    pub input: I,
    /// Presses seen since the record was opened, at least 1
    pub presses: u32,
    /// Timestamp of the most recent press
    pub pressed_at: Option<Millis>,
    /// Timestamp of the release that followed the most recent press
    pub released_at: Option<Millis>,
}

impl<I> PressRecord<I> {
    fn open(input: I) -> Self {
        Self {
            input,
            presses: 0,
            pressed_at: None,
            released_at: None,
        }
    }

    /// Whether the input is down as far as this record knows
    pub fn is_held(&self) -> bool {
        self.pressed_at.is_some() && self.released_at.is_none()
    }
}

/// Press records plus the set of inputs currently held down
///
/// Records are kept in the order they were opened, which is also the order
/// resolution inspects them in. The held set is kept sorted so it doubles as
/// a canonical chord key.
#[derive(Clone, Debug)]
pub(crate) struct PressTracker<I> {
    records: Vec<PressRecord<I>>,
    held: Vec<I>,
}

impl<I: Copy + Ord + Debug> PressTracker<I> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            held: Vec::new(),
        }
    }

    pub fn records(&self) -> &[PressRecord<I>] {
        &self.records
    }

    pub fn held(&self) -> &[I] {
        &self.held
    }

    pub fn is_busy(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn hold(&mut self, input: I) {
        if let Err(slot) = self.held.binary_search(&input) {
            self.held.insert(slot, input);
        }
    }

    pub fn unhold(&mut self, input: I) {
        if let Ok(slot) = self.held.binary_search(&input) {
            self.held.remove(slot);
        }
    }

    /// Count a press, opening a record for an idle input
    pub fn record_press(&mut self, input: I, timestamp: Millis) {
        let slot = match self.position(&input) {
            Some(slot) => slot,
            None => {
                self.records.push(PressRecord::open(input));
                self.records.len() - 1
            }
        };

        let record = &mut self.records[slot];
        record.presses = record.presses.saturating_add(1);
        record.pressed_at = Some(timestamp);
        record.released_at = None;
        log::debug!(
            "Key pressed. Input: {:?}, Presses: {}, TS: {}",
            record.input,
            record.presses,
            timestamp
        );
    }

    /// Close the press window of an active record
    ///
    /// Releases without a recorded press are ignored.
    pub fn record_release(&mut self, input: I, timestamp: Millis) {
        let Some(record) = self
            .records
            .iter_mut()
            .find(|record| record.input == input && record.pressed_at.is_some())
        else {
            log::trace!("Ignoring release of idle input {:?}", input);
            return;
        };

        record.released_at = Some(timestamp);
        log::debug!(
            "Key released. Input: {:?}, Presses: {}, TS: {}",
            record.input,
            record.presses,
            timestamp
        );
    }

    /// Take the held set, dropping the records of every input in it
    pub fn take_held(&mut self) -> Vec<I> {
        let held = core::mem::take(&mut self.held);
        self.records.retain(|record| held.binary_search(&record.input).is_err());
        held
    }

    /// Remove and return the record at `slot`, keeping the rest in order
    pub fn remove_at(&mut self, slot: usize) -> PressRecord<I> {
        self.records.remove(slot)
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.held.clear();
    }

    fn position(&self, input: &I) -> Option<usize> {
        self.records.iter().position(|record| record.input == *input)
    }
}
