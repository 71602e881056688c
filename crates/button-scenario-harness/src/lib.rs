//! Host-side scenario test harness for scripted button flows.

use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::rc::Rc;

use button_actions::{
    handler, Action, ActionKey, Buttons, Config, Millis, QueueSource, Registry,
};

/// Default polling interval used when advancing the clock
pub const DEFAULT_TICK_MS: Millis = 10;

/// An action observed by the harness, stamped with the cycle time
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fired<I> {
    pub at: Millis,
    pub action: Action<I>,
}

/// Install `env_logger` for test output; safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Couples a classifier with queue sources and a simulated clock.
pub struct ScenarioHarness<I> {
    buttons: Buttons<I, QueueSource>,
    now: Rc<Cell<Millis>>,
    tick_ms: Millis,
    fired: Rc<RefCell<Vec<Fired<I>>>>,
}

impl<I> ScenarioHarness<I>
where
    I: Copy + Ord + Debug + 'static,
{
    /// Construct a harness starting at t=0 with no bindings.
    pub fn new(config: Config<I>) -> Self {
        Self {
            buttons: Buttons::new(config, |_| QueueSource::new()),
            now: Rc::new(Cell::new(0)),
            tick_ms: DEFAULT_TICK_MS,
            fired: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Change the polling interval used by [`Self::advance`].
    pub fn with_tick_ms(mut self, tick_ms: Millis) -> Self {
        self.tick_ms = tick_ms.max(1);
        self
    }

    /// A handler that appends to the harness log.
    pub fn recorder(&self) -> button_actions::Handler<I> {
        let fired = self.fired.clone();
        let now = self.now.clone();
        handler(move |_: &mut Registry<I>, action: &Action<I>| {
            fired.borrow_mut().push(Fired {
                at: now.get(),
                action: action.clone(),
            });
        })
    }

    /// Record dispatches of `key`.
    pub fn record(&mut self, key: ActionKey<I>) {
        let recorder = self.recorder();
        self.buttons.registry_mut().register(key, recorder);
    }

    /// Record every unbound action through the fallback.
    pub fn record_unbound(&mut self) {
        let recorder = self.recorder();
        self.buttons.registry_mut().set_fallback(Some(recorder));
    }

    /// Queue a press edge at the current time.
    pub fn press(&mut self, input: I) -> Result<(), String> {
        let now = self.now();
        let (group, index) = self.locate(input)?;
        if let Some(source) = self.buttons.source_mut(group) {
            source.press(index, now);
        }
        Ok(())
    }

    /// Queue a release edge at the current time.
    pub fn release(&mut self, input: I) -> Result<(), String> {
        let now = self.now();
        let (group, index) = self.locate(input)?;
        if let Some(source) = self.buttons.source_mut(group) {
            source.release(index, now);
        }
        Ok(())
    }

    /// Press, hold for `hold_ms` while polling, then release.
    pub fn tap(&mut self, input: I, hold_ms: Millis) -> Result<(), String> {
        self.press(input)?;
        self.advance(hold_ms);
        self.release(input)
    }

    /// Run one cycle at the current time.
    pub fn cycle(&mut self) -> bool {
        let now = self.now();
        self.buttons.cycle(now)
    }

    /// Move the clock forward `ms`, cycling once per tick.
    ///
    /// Returns the number of actions dispatched meanwhile.
    pub fn advance(&mut self, ms: Millis) -> usize {
        let before = self.fired.borrow().len();
        let target = self.now().wrapping_add(ms);

        self.cycle();
        let mut remaining = ms;
        while remaining > 0 {
            let step = remaining.min(self.tick_ms);
            remaining -= step;
            self.now.set(self.now().wrapping_add(step));
            self.cycle();
        }
        debug_assert_eq!(self.now(), target);

        self.fired.borrow().len() - before
    }

    /// Poll until no press is pending or a safety cap is reached.
    pub fn settle_until_idle(&mut self) -> usize {
        const MAX_TICKS: usize = 10_000;
        let mut ticks = 0;

        while self.cycle() && ticks < MAX_TICKS {
            self.now.set(self.now().wrapping_add(self.tick_ms));
            ticks += 1;
        }

        ticks
    }

    /// Jump the clock without cycling.
    pub fn set_now(&mut self, now: Millis) {
        self.now.set(now);
    }

    pub fn now(&self) -> Millis {
        self.now.get()
    }

    /// Actions dispatched so far.
    pub fn fired(&self) -> Vec<Fired<I>> {
        self.fired.borrow().clone()
    }

    /// Actions dispatched so far, without timestamps.
    pub fn actions(&self) -> Vec<Action<I>> {
        self.fired
            .borrow()
            .iter()
            .map(|fired| fired.action.clone())
            .collect()
    }

    /// Drain the action log.
    pub fn take_fired(&mut self) -> Vec<Fired<I>> {
        std::mem::take(&mut *self.fired.borrow_mut())
    }

    /// Access the classifier for assertions.
    pub fn buttons(&self) -> &Buttons<I, QueueSource> {
        &self.buttons
    }

    /// Access the classifier for scenario setup.
    pub fn buttons_mut(&mut self) -> &mut Buttons<I, QueueSource> {
        &mut self.buttons
    }

    /// Access the registry for scenario setup.
    pub fn registry_mut(&mut self) -> &mut Registry<I> {
        self.buttons.registry_mut()
    }

    fn locate(&self, input: I) -> Result<(usize, usize), String> {
        self.buttons
            .locate(&input)
            .ok_or_else(|| format!("{:?} is not a configured input", input))
    }
}
