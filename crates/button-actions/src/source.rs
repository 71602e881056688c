//! Event source abstraction
//!
//! This module provides the [`EventSource`] trait consumed by the classifier,
//! plus two implementations:
//!
//! - [`QueueSource`] - an in-memory FIFO, for host simulation and tests
//! - [`PinScanner`] - samples a group of [`InputPin`]s and turns level changes
//!   into edges
//!
//! ## Example
//!
//! ```rust,ignore
//! use button_actions::{PinScanner, Polarity};
//!
//! // One scanner per scan group, pins in the group's input order
//! let mut scanner = PinScanner::new(vec![btn_a, btn_b], Polarity::ActiveLow);
//!
//! // From the main loop, before running a cycle
//! scanner.scan(clock.now_ms());
//! ```

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::vec::Vec;

use embedded_hal::digital::InputPin;

use crate::config::Polarity;
use crate::event::{EdgeEvent, Millis};

/// Non-blocking supplier of raw edge events for one scan group
///
/// ## Implementing
///
/// Implementations must deliver events for a given input in chronological
/// order and must never block; return `None` when nothing is pending.
pub trait EventSource {
    /// Pop the next pending event, if any
    fn try_next(&mut self) -> Option<EdgeEvent>;
}

impl<S: EventSource + ?Sized> EventSource for &mut S {
    fn try_next(&mut self) -> Option<EdgeEvent> {
        (**self).try_next()
    }
}

impl<S: EventSource + ?Sized> EventSource for Box<S> {
    fn try_next(&mut self) -> Option<EdgeEvent> {
        (**self).try_next()
    }
}

/// FIFO of pre-recorded events
#[derive(Clone, Debug, Default)]
pub struct QueueSource {
    events: VecDeque<EdgeEvent>,
}

impl QueueSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: EdgeEvent) {
        self.events.push_back(event);
    }

    pub fn press(&mut self, index: usize, timestamp: Millis) {
        self.push(EdgeEvent::pressed(index, timestamp));
    }

    pub fn release(&mut self, index: usize, timestamp: Millis) {
        self.push(EdgeEvent::released(index, timestamp));
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSource for QueueSource {
    fn try_next(&mut self) -> Option<EdgeEvent> {
        self.events.pop_front()
    }
}

impl Extend<EdgeEvent> for QueueSource {
    fn extend<T: IntoIterator<Item = EdgeEvent>>(&mut self, iter: T) {
        self.events.extend(iter);
    }
}

/// Level-change detector over a group of input pins
///
/// Every pin starts out released. No debouncing is done here; feed it pins
/// that are already debounced (hardware RC, or a debounced GPIO driver).
pub struct PinScanner<P> {
    pins: Vec<P>,
    polarity: Polarity,
    pressed: Vec<bool>,
    queue: VecDeque<EdgeEvent>,
}

impl<P: InputPin> PinScanner<P> {
    /// Create a scanner; event indices follow the order of `pins`
    pub fn new(pins: Vec<P>, polarity: Polarity) -> Self {
        let pressed = alloc::vec![false; pins.len()];
        Self {
            pins,
            polarity,
            pressed,
            queue: VecDeque::new(),
        }
    }

    /// Sample every pin once, queueing an edge for each change
    ///
    /// Returns the number of edges queued by this scan. A pin that fails to
    /// read keeps its previous state.
    pub fn scan(&mut self, now: Millis) -> usize {
        let mut queued = 0;
        for (index, pin) in self.pins.iter_mut().enumerate() {
            let level_high = match pin.is_high() {
                Ok(level) => level,
                Err(err) => {
                    log::warn!("Pin {} read failed: {:?}", index, err);
                    continue;
                }
            };

            let is_pressed = self.polarity.is_pressed(level_high);
            if is_pressed == self.pressed[index] {
                continue;
            }
            self.pressed[index] = is_pressed;

            let event = if is_pressed {
                EdgeEvent::pressed(index, now)
            } else {
                EdgeEvent::released(index, now)
            };
            self.queue.push_back(event);
            queued += 1;
        }
        queued
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Give the pins back
    pub fn release(self) -> Vec<P> {
        self.pins
    }
}

impl<P: InputPin> EventSource for PinScanner<P> {
    fn try_next(&mut self) -> Option<EdgeEvent> {
        self.queue.pop_front()
    }
}
