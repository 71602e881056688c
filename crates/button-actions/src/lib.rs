//! Button action classifier for polled input lines.
//!
//! Turns raw press/release edges into counted short presses (single, double,
//! triple...), long presses and multi-key chords, and dispatches each one to a
//! bound handler. Built for firmware main loops: no scheduler, no blocking,
//! time passed in by the caller.
//!
//! ## Pipeline
//!
//! 1. Each scan group's [`EventSource`] is drained into per-input
//!    [`PressRecord`]s and the held set.
//! 2. Every press re-checks the held set against bound chords. A match fires
//!    right away and wipes the state of the keys involved.
//! 3. Once per cycle, the first record whose timing has settled is finalized
//!    into a [`Press`] and dispatched through the [`Registry`].
//!
//! ## Example
//!
//! ```
//! use button_actions::{Builder, Buttons, Polarity, QueueSource};
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
//! enum Key {
//!     Up,
//!     Down,
//! }
//!
//! let config = Builder::new()
//!     .input(Key::Up, Polarity::ActiveLow)
//!     .input(Key::Down, Polarity::ActiveLow)
//!     .build()
//!     .expect("valid configuration");
//!
//! let mut buttons = Buttons::new(config, |_| QueueSource::new());
//! buttons.registry_mut().on_press(Key::Up, 2, false, |_, _| log::info!("double up"));
//! buttons.registry_mut().on_chord([Key::Up, Key::Down], |_, _| log::info!("both"));
//!
//! // main loop:
//! // scan inputs into the sources, then
//! let busy = buttons.cycle(0);
//! assert!(!busy);
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::unreachable,
        clippy::unwrap_used
    )
)]

extern crate alloc;

pub mod buttons;
mod chord;
pub mod config;
pub mod error;
pub mod event;
pub mod registry;
mod resolve;
pub mod source;
mod tracker;

pub use buttons::Buttons;
pub use config::{
    Builder, Config, Polarity, ScanGroup, DEFAULT_LONG_PRESS_THRESHOLD_MS,
    DEFAULT_SHORT_PRESS_THRESHOLD_MS,
};
pub use error::ConfigError;
pub use event::{Edge, EdgeEvent, Millis};
pub use registry::{handler, Action, ActionKey, Handler, Press, Registry};
pub use source::{EventSource, PinScanner, QueueSource};
pub use tracker::PressRecord;
