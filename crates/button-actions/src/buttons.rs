//! Top-level classifier
//!
//! [`Buttons`] owns the scan-group sources, the press tracker and the callback
//! registry. Drive it from the main loop with [`Buttons::cycle`]:
//!
//! ```
//! use button_actions::{Builder, Buttons, Polarity, QueueSource};
//!
//! let config = Builder::new()
//!     .input("play", Polarity::ActiveLow)
//!     .short_press_threshold_ms(500)
//!     .long_press_threshold_ms(2000)
//!     .build()
//!     .unwrap();
//! let mut buttons = Buttons::new(config, |_| QueueSource::new());
//! buttons.registry_mut().on_press("play", 1, false, |_, _| {});
//!
//! let (group, index) = buttons.locate(&"play").unwrap();
//! let source = buttons.source_mut(group).unwrap();
//! source.press(index, 0);
//! source.release(index, 100);
//!
//! assert!(buttons.cycle(200)); // still settling
//! assert!(!buttons.cycle(700)); // single press dispatched
//! ```

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::chord;
use crate::config::{Config, ScanGroup};
use crate::event::{Edge, EdgeEvent, Millis};
use crate::registry::{Action, Press, Registry};
use crate::resolve::{self, Thresholds};
use crate::source::EventSource;
use crate::tracker::{PressRecord, PressTracker};

/// Press classifier and dispatcher for one set of inputs
pub struct Buttons<I, S> {
    config: Config<I>,
    /// One source per scan group, same order as `config.groups()`
    sources: Vec<S>,
    tracker: PressTracker<I>,
    registry: Registry<I>,
}

impl<I, S> Buttons<I, S>
where
    I: Copy + Ord + Debug,
    S: EventSource,
{
    /// Create a classifier, building one event source per scan group
    pub fn new(config: Config<I>, make_source: impl FnMut(&ScanGroup<I>) -> S) -> Self {
        let sources = config.groups().iter().map(make_source).collect();
        Self {
            config,
            sources,
            tracker: PressTracker::new(),
            registry: Registry::new(),
        }
    }

    /// Drain every source and update press state
    ///
    /// Groups are drained in order, each in arrival order. If a press
    /// completes a bound chord, the chord handler runs and the rest of the
    /// batch is left queued for the next call. Returns the fired chord.
    pub fn ingest(&mut self) -> Option<Action<I>> {
        for group in 0..self.sources.len() {
            while let Some(event) = self.sources[group].try_next() {
                if let Some(action) = self.apply(group, event) {
                    return Some(action);
                }
            }
        }
        None
    }

    fn apply(&mut self, group: usize, event: EdgeEvent) -> Option<Action<I>> {
        let Some(input) = self.config.groups()[group].input(event.index) else {
            log::warn!(
                "Dropping {:?} for unknown index {} in scan group {}",
                event.edge,
                event.index,
                group
            );
            return None;
        };

        match event.edge {
            Edge::Pressed => {
                self.tracker.hold(input);
                if let Some(fired) = chord::detect(&mut self.tracker, &self.registry) {
                    let action = Action::Chord(fired.inputs);
                    (fired.handler)(&mut self.registry, &action);
                    return Some(action);
                }
                self.tracker.record_press(input, event.timestamp);
            }
            Edge::Released => {
                self.tracker.unhold(input);
                self.tracker.record_release(input, event.timestamp);
            }
        }
        None
    }

    /// Finalize at most one settled record without dispatching it
    pub fn resolve(&mut self, now: Millis) -> Option<Press<I>> {
        let thresholds = Thresholds {
            short_press_ms: self.config.short_press_threshold_ms,
            long_press_ms: self.config.long_press_threshold_ms,
        };
        resolve::resolve(&mut self.tracker, thresholds, now)
    }

    /// Run one polling cycle
    ///
    /// Ingests pending edges, then resolves and dispatches at most one press.
    /// A cycle whose ingest fired a chord skips resolution, so every cycle
    /// runs at most one handler. Returns whether presses are still pending,
    /// which callers use to keep polling at a faster rate.
    pub fn cycle(&mut self, now: Millis) -> bool {
        if self.ingest().is_none() {
            if let Some(press) = self.resolve(now) {
                self.registry.dispatch(&Action::Press(press));
            }
        }
        self.is_busy()
    }

    /// Whether any press sequence is still unresolved
    pub fn is_busy(&self) -> bool {
        self.tracker.is_busy()
    }

    /// Unresolved press records, oldest first
    pub fn pending(&self) -> &[PressRecord<I>] {
        self.tracker.records()
    }

    /// Inputs currently held down, sorted
    pub fn held(&self) -> &[I] {
        self.tracker.held()
    }

    /// Forget all press state; bindings are kept
    pub fn reset(&mut self) {
        self.tracker.clear();
    }

    pub fn config(&self) -> &Config<I> {
        &self.config
    }

    pub fn groups(&self) -> &[ScanGroup<I>] {
        self.config.groups()
    }

    /// Scan group and event index carrying `input`
    pub fn locate(&self, input: &I) -> Option<(usize, usize)> {
        self.config.locate(input)
    }

    pub fn source_mut(&mut self, group: usize) -> Option<&mut S> {
        self.sources.get_mut(group)
    }

    pub fn sources_mut(&mut self) -> &mut [S] {
        &mut self.sources
    }

    pub fn registry(&self) -> &Registry<I> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry<I> {
        &mut self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    use proptest::prelude::*;

    use crate::config::{Builder, Polarity};
    use crate::registry::{handler, ActionKey, Handler};
    use crate::source::QueueSource;

    const A: u8 = 0;
    const B: u8 = 1;
    const C: u8 = 2;

    type Fired = Rc<RefCell<Vec<Action<u8>>>>;

    fn recorder() -> (Fired, Handler<u8>) {
        let fired: Fired = Rc::new(RefCell::new(Vec::new()));
        let sink = fired.clone();
        let bound = handler(move |_: &mut Registry<u8>, action: &Action<u8>| {
            sink.borrow_mut().push(action.clone())
        });
        (fired, bound)
    }

    fn buttons(short: u32, long: u32) -> Buttons<u8, QueueSource> {
        let config = Builder::new()
            .input(A, Polarity::ActiveLow)
            .input(B, Polarity::ActiveLow)
            .input(C, Polarity::ActiveHigh)
            .short_press_threshold_ms(short)
            .long_press_threshold_ms(long)
            .build()
            .unwrap();
        Buttons::new(config, |_| QueueSource::new())
    }

    fn press(buttons: &mut Buttons<u8, QueueSource>, input: u8, at: Millis) {
        let (group, index) = buttons.locate(&input).unwrap();
        buttons.source_mut(group).unwrap().press(index, at);
    }

    fn release(buttons: &mut Buttons<u8, QueueSource>, input: u8, at: Millis) {
        let (group, index) = buttons.locate(&input).unwrap();
        buttons.source_mut(group).unwrap().release(index, at);
    }

    fn single(input: u8, presses: u32, long: bool) -> Action<u8> {
        Action::Press(Press {
            input,
            presses,
            long,
        })
    }

    #[test]
    fn single_press_settles_after_window() {
        let mut buttons = buttons(500, 2000);
        let (fired, fallback) = recorder();
        buttons.registry_mut().set_fallback(Some(fallback));

        press(&mut buttons, A, 0);
        release(&mut buttons, A, 100);

        assert!(buttons.cycle(200));
        assert!(fired.borrow().is_empty());

        assert!(!buttons.cycle(700));
        assert_eq!(fired.borrow().as_slice(), &[single(A, 1, false)]);
    }

    #[test]
    fn double_press_is_counted() {
        let mut buttons = buttons(500, 2000);
        let (fired, double) = recorder();
        buttons
            .registry_mut()
            .register(ActionKey::press(A, 2, false), double);

        press(&mut buttons, A, 0);
        release(&mut buttons, A, 80);
        press(&mut buttons, A, 300);
        release(&mut buttons, A, 380);

        buttons.ingest();
        assert_eq!(buttons.pending()[0].presses, 2);

        assert!(buttons.cycle(500));
        assert!(!buttons.cycle(881));
        assert_eq!(fired.borrow().as_slice(), &[single(A, 2, false)]);
    }

    #[test]
    fn long_press_wins_over_count() {
        let mut buttons = buttons(500, 2000);
        let (fired, fallback) = recorder();
        buttons.registry_mut().set_fallback(Some(fallback));

        press(&mut buttons, B, 0);
        release(&mut buttons, B, 50);
        press(&mut buttons, B, 100);

        assert!(buttons.cycle(2100));
        assert!(!buttons.cycle(2101));
        assert_eq!(fired.borrow().as_slice(), &[single(B, 2, true)]);
    }

    #[test]
    fn disabled_short_threshold_keeps_records() {
        let mut buttons = buttons(0, 2000);
        let (fired, fallback) = recorder();
        buttons.registry_mut().set_fallback(Some(fallback));

        press(&mut buttons, A, 0);
        release(&mut buttons, A, 10);

        for now in [100, 10_000, 1_000_000] {
            assert!(buttons.cycle(now));
        }
        assert!(fired.borrow().is_empty());

        // A later hold is still caught by long-press logic
        press(&mut buttons, A, 1_000_000);
        assert!(buttons.cycle(1_000_001));
        assert!(!buttons.cycle(1_002_001));
        assert_eq!(fired.borrow().as_slice(), &[single(A, 2, true)]);
    }

    #[test]
    fn chord_preempts_single_presses() {
        let mut buttons = buttons(500, 2000);
        let (chords, chord) = recorder();
        let (singles, single_a) = recorder();
        buttons.registry_mut().set_chord([B, A], Some(chord));
        buttons
            .registry_mut()
            .register(ActionKey::press(A, 1, false), single_a);

        press(&mut buttons, A, 0);
        press(&mut buttons, B, 20);
        release(&mut buttons, A, 200);
        release(&mut buttons, B, 210);

        assert!(!buttons.cycle(30));
        assert_eq!(chords.borrow().as_slice(), &[Action::Chord(vec![A, B])]);
        assert!(buttons.held().is_empty());

        // Trailing releases find no records
        for now in [40, 1000, 5000] {
            assert!(!buttons.cycle(now));
        }
        assert!(singles.borrow().is_empty());
        assert_eq!(chords.borrow().len(), 1);
    }

    #[test]
    fn chord_aborts_rest_of_batch() {
        let mut buttons = buttons(500, 2000);
        let (chords, chord) = recorder();
        buttons.registry_mut().set_chord([A, B], Some(chord));

        press(&mut buttons, A, 0);
        press(&mut buttons, B, 10);
        release(&mut buttons, A, 20);

        assert_eq!(buttons.ingest(), Some(Action::Chord(vec![A, B])));
        assert!(buttons.pending().is_empty());
        assert_eq!(chords.borrow().len(), 1);

        // The release was left queued for the next batch
        let (group, _) = buttons.locate(&A).unwrap();
        assert_eq!(buttons.source_mut(group).unwrap().len(), 1);
        assert_eq!(buttons.ingest(), None);
        assert_eq!(buttons.source_mut(group).unwrap().len(), 0);
        assert!(buttons.held().is_empty());
    }

    #[test]
    fn groups_drain_in_polarity_order() {
        let mut buttons = buttons(500, 2000);
        press(&mut buttons, A, 0);
        press(&mut buttons, C, 5);

        buttons.ingest();
        let inputs: Vec<u8> = buttons.pending().iter().map(|r| r.input).collect();
        assert_eq!(inputs, [C, A]);
    }

    #[test]
    fn chord_handler_receives_registry() {
        let mut buttons = buttons(500, 2000);
        let (fired, fallback) = recorder();
        buttons.registry_mut().on_chord([A, B], move |registry, _| {
            registry.clear();
            registry.set_fallback(Some(fallback.clone()));
        });
        buttons.registry_mut().on_press(C, 1, false, |_, _| {});

        press(&mut buttons, A, 0);
        press(&mut buttons, B, 0);
        buttons.cycle(1);
        assert_eq!(buttons.registry().len(), 1);

        press(&mut buttons, C, 10);
        release(&mut buttons, C, 20);
        buttons.cycle(30);
        buttons.cycle(600);
        assert_eq!(fired.borrow().as_slice(), &[single(C, 1, false)]);
    }

    #[test]
    fn unknown_index_is_dropped() {
        let mut buttons = buttons(500, 2000);
        buttons.source_mut(0).unwrap().press(42, 0);
        assert!(!buttons.cycle(1));
        assert!(buttons.held().is_empty());
    }

    #[test]
    fn reset_forgets_state_but_keeps_bindings() {
        let mut buttons = buttons(500, 2000);
        buttons.registry_mut().on_fallback(|_, _| {});
        press(&mut buttons, A, 0);
        assert!(buttons.cycle(1));

        buttons.reset();
        assert!(!buttons.is_busy());
        assert!(buttons.held().is_empty());
        assert_eq!(buttons.registry().len(), 1);
    }

    #[derive(Clone, Debug)]
    enum Step {
        Press(u8),
        Release(u8),
        Cycle,
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0u8..3).prop_map(Step::Press),
            (0u8..3).prop_map(Step::Release),
            Just(Step::Cycle),
        ]
    }

    proptest! {
        #[test]
        fn at_most_one_action_per_cycle(
            steps in prop::collection::vec((step(), 0u32..400), 1..200)
        ) {
            let mut buttons = buttons(150, 600);
            let (fired, fallback) = recorder();
            buttons.registry_mut().set_fallback(Some(fallback));
            let (chords, chord) = recorder();
            buttons.registry_mut().set_chord([A, B], Some(chord.clone()));
            buttons.registry_mut().set_chord([A, B, C], Some(chord));

            let mut now: Millis = 0;
            for (step, gap) in steps {
                now += gap;
                match step {
                    Step::Press(input) => press(&mut buttons, input, now),
                    Step::Release(input) => release(&mut buttons, input, now),
                    Step::Cycle => {
                        let before = fired.borrow().len() + chords.borrow().len();
                        let busy = buttons.cycle(now);
                        let after = fired.borrow().len() + chords.borrow().len();
                        prop_assert!(after - before <= 1);
                        prop_assert_eq!(busy, !buttons.pending().is_empty());
                    }
                }

                let mut inputs: Vec<u8> = buttons.pending().iter().map(|r| r.input).collect();
                let total = inputs.len();
                inputs.sort_unstable();
                inputs.dedup();
                prop_assert_eq!(inputs.len(), total);
                prop_assert!(buttons.pending().iter().all(|r| r.presses >= 1));
            }
        }
    }
}
