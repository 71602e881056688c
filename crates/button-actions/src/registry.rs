//! Callback registry
//!
//! Maps [`ActionKey`]s to handlers, with one optional fallback that catches
//! any dispatched action without a specific binding.
//!
//! Handlers receive `&mut Registry` so a handler can rebind keys (switch
//! modes, arm a one-shot chord, tear itself down) while it runs. The handler
//! being invoked is cloned out of the map first, so removing or replacing it
//! from inside its own call is fine.
//!
//! ## Example
//!
//! ```
//! use button_actions::{Action, ActionKey, Registry};
//!
//! let mut registry = Registry::new();
//! registry.on_press('a', 2, false, |_, action| {
//!     log::info!("double press: {:?}", action);
//! });
//! registry.on_chord(['a', 'b'], |registry, _| {
//!     // Chord enters a mode where the fallback swallows everything
//!     registry.clear();
//!     registry.on_fallback(|_, _| {});
//! });
//!
//! assert!(registry.contains(&ActionKey::chord(['b', 'a'])));
//! ```

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt::Debug;

/// A finalized single-input action
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Press<I> {
    pub input: I,
    /// Number of presses in the sequence, at least 1
    pub presses: u32,
    /// Whether the sequence ended with the input held past the long threshold
    pub long: bool,
}

/// Anything the classifier can dispatch
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action<I> {
    Press(Press<I>),
    /// Inputs of a fired chord, sorted
    Chord(Vec<I>),
}

/// Registry lookup key
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKey<I> {
    Press { input: I, presses: u32, long: bool },
    /// Sorted, deduplicated set of inputs
    Chord(Vec<I>),
    /// Catches any action without a specific binding
    Fallback,
}

impl<I: Copy + Ord> ActionKey<I> {
    pub fn press(input: I, presses: u32, long: bool) -> Self {
        ActionKey::Press {
            input,
            presses,
            long,
        }
    }

    /// Chord key in canonical order, independent of how `inputs` is ordered
    pub fn chord(inputs: impl IntoIterator<Item = I>) -> Self {
        let mut inputs: Vec<I> = inputs.into_iter().collect();
        inputs.sort_unstable();
        inputs.dedup();
        ActionKey::Chord(inputs)
    }
}

impl<I: Copy + Ord> From<Press<I>> for ActionKey<I> {
    fn from(press: Press<I>) -> Self {
        ActionKey::press(press.input, press.presses, press.long)
    }
}

impl<I: Copy + Ord> Action<I> {
    /// Key a handler for this action would be registered under
    pub fn key(&self) -> ActionKey<I> {
        match self {
            Action::Press(press) => ActionKey::from(*press),
            Action::Chord(inputs) => ActionKey::chord(inputs.iter().copied()),
        }
    }
}

/// Shared, reentrancy-safe handler
pub type Handler<I> = Rc<dyn Fn(&mut Registry<I>, &Action<I>)>;

/// Wrap a closure as a [`Handler`], for the `set_*` family
pub fn handler<I, F>(f: F) -> Handler<I>
where
    F: Fn(&mut Registry<I>, &Action<I>) + 'static,
{
    Rc::new(f)
}

/// Action key to handler map with an optional fallback entry
pub struct Registry<I> {
    handlers: BTreeMap<ActionKey<I>, Handler<I>>,
}

impl<I> Default for Registry<I> {
    fn default() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }
}

impl<I: Debug> Debug for Registry<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

impl<I: Copy + Ord + Debug> Registry<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key`, replacing any previous binding
    ///
    /// A chord key with fewer than two inputs is ignored; it could never be
    /// told apart from a plain press.
    pub fn register(&mut self, key: ActionKey<I>, handler: Handler<I>) {
        let key = match key {
            ActionKey::Chord(inputs) => ActionKey::chord(inputs),
            key => key,
        };
        if let ActionKey::Chord(inputs) = &key {
            if inputs.len() < 2 {
                log::warn!("Ignoring chord binding with {} input(s)", inputs.len());
                return;
            }
        }
        log::trace!("Register {:?}", key);
        self.handlers.insert(key, handler);
    }

    /// Drop the binding for `key`; unknown keys are ignored
    pub fn unregister(&mut self, key: &ActionKey<I>) {
        let removed = match key {
            ActionKey::Chord(inputs) => self
                .handlers
                .remove(&ActionKey::chord(inputs.iter().copied())),
            key => self.handlers.remove(key),
        };
        if removed.is_some() {
            log::trace!("Unregister {:?}", key);
        }
    }

    pub fn on_press<F>(&mut self, input: I, presses: u32, long: bool, f: F)
    where
        F: Fn(&mut Registry<I>, &Action<I>) + 'static,
    {
        self.register(ActionKey::press(input, presses, long), Rc::new(f));
    }

    pub fn on_chord<F>(&mut self, inputs: impl IntoIterator<Item = I>, f: F)
    where
        F: Fn(&mut Registry<I>, &Action<I>) + 'static,
    {
        self.register(ActionKey::chord(inputs), Rc::new(f));
    }

    pub fn on_fallback<F>(&mut self, f: F)
    where
        F: Fn(&mut Registry<I>, &Action<I>) + 'static,
    {
        self.register(ActionKey::Fallback, Rc::new(f));
    }

    /// Bind or, with `None`, unbind a single-input action
    pub fn set_press(&mut self, input: I, presses: u32, long: bool, handler: Option<Handler<I>>) {
        self.set(ActionKey::press(input, presses, long), handler);
    }

    /// Bind or, with `None`, unbind a chord
    pub fn set_chord(&mut self, inputs: impl IntoIterator<Item = I>, handler: Option<Handler<I>>) {
        self.set(ActionKey::chord(inputs), handler);
    }

    /// Bind or, with `None`, unbind the fallback
    pub fn set_fallback(&mut self, handler: Option<Handler<I>>) {
        self.set(ActionKey::Fallback, handler);
    }

    fn set(&mut self, key: ActionKey<I>, handler: Option<Handler<I>>) {
        match handler {
            Some(handler) => self.register(key, handler),
            None => self.unregister(&key),
        }
    }

    /// Remove every binding, the fallback included
    pub fn clear(&mut self) {
        for key in self.handlers.keys() {
            log::debug!("Remove key: {:?}", key);
        }
        self.handlers.clear();
    }

    pub fn contains(&self, key: &ActionKey<I>) -> bool {
        self.handlers.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Snapshot of the handler bound to exactly `key`
    pub(crate) fn lookup(&self, key: &ActionKey<I>) -> Option<Handler<I>> {
        self.handlers.get(key).cloned()
    }

    /// Run the handler for `action`, falling back to the fallback entry
    ///
    /// Returns whether a handler ran. Unbound actions are dropped.
    pub fn dispatch(&mut self, action: &Action<I>) -> bool {
        let handler = self
            .lookup(&action.key())
            .or_else(|| self.lookup(&ActionKey::Fallback));

        match handler {
            Some(handler) => {
                handler(self, action);
                true
            }
            None => {
                log::trace!("No handler for {:?}", action);
                false
            }
        }
    }
}
