//! Classifier configuration types and builder

use alloc::vec::Vec;

pub use crate::error::ConfigError;

/// Default settle window after a release, in milliseconds
pub const DEFAULT_SHORT_PRESS_THRESHOLD_MS: u32 = 500;

/// Default hold time before a press counts as long, in milliseconds
pub const DEFAULT_LONG_PRESS_THRESHOLD_MS: u32 = 2000;

/// Electrical level that means "pressed" for an input
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Polarity {
    /// Pressed reads high (pull-down wiring)
    ActiveHigh,
    /// Pressed reads low (pull-up wiring, the common case)
    #[default]
    ActiveLow,
}

impl Polarity {
    /// Translate a sampled pin level into a pressed flag
    pub fn is_pressed(self, level_high: bool) -> bool {
        match self {
            Polarity::ActiveHigh => level_high,
            Polarity::ActiveLow => !level_high,
        }
    }
}

/// A set of inputs sharing one polarity
///
/// Raw edge events from a group refer to inputs by their position in
/// [`ScanGroup::inputs`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanGroup<I> {
    polarity: Polarity,
    inputs: Vec<I>,
}

impl<I: Copy + Ord> ScanGroup<I> {
    /// Polarity shared by every input in the group
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Inputs in event-index order
    pub fn inputs(&self) -> &[I] {
        &self.inputs
    }

    /// Input addressed by an event index, if in range
    pub fn input(&self, index: usize) -> Option<I> {
        self.inputs.get(index).copied()
    }

    /// Event index of `input` inside this group
    pub fn index_of(&self, input: &I) -> Option<usize> {
        self.inputs.iter().position(|candidate| candidate == input)
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// Classifier configuration
///
/// Use [`Builder`] to create a Config. Scan groups are fixed once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config<I> {
    /// Settle window after a release; 0 disables short-press resolution
    pub short_press_threshold_ms: u32,
    /// Hold time for a long press; 0 disables long-press resolution
    pub long_press_threshold_ms: u32,
    groups: Vec<ScanGroup<I>>,
}

impl<I: Copy + Ord> Config<I> {
    /// Scan groups in polling order
    pub fn groups(&self) -> &[ScanGroup<I>] {
        &self.groups
    }

    /// Find the group and event index that carry `input`
    pub fn locate(&self, input: &I) -> Option<(usize, usize)> {
        self.groups
            .iter()
            .enumerate()
            .find_map(|(group, scan)| scan.index_of(input).map(|index| (group, index)))
    }
}

/// Builder for constructing classifier configuration
///
/// # Example
///
/// ```
/// use button_actions::{Builder, Polarity};
///
/// let config = Builder::new()
///     .input('a', Polarity::ActiveLow)
///     .input('b', Polarity::ActiveLow)
///     .input('x', Polarity::ActiveHigh)
///     .short_press_threshold_ms(300)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.groups().len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct Builder<I> {
    /// Input to polarity assignments, in call order
    assignments: Vec<(I, Polarity)>,
    short_press_threshold_ms: u32,
    long_press_threshold_ms: u32,
}

impl<I> Default for Builder<I> {
    fn default() -> Self {
        Builder {
            assignments: Vec::new(),
            short_press_threshold_ms: DEFAULT_SHORT_PRESS_THRESHOLD_MS,
            long_press_threshold_ms: DEFAULT_LONG_PRESS_THRESHOLD_MS,
        }
    }
}

impl<I: Copy + Ord> Builder<I> {
    /// Create a new Builder with default thresholds and no inputs
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign an input to the scan group for `polarity`
    pub fn input(mut self, input: I, polarity: Polarity) -> Self {
        self.assignments.push((input, polarity));
        self
    }

    /// Assign several inputs at once
    pub fn inputs(mut self, inputs: impl IntoIterator<Item = (I, Polarity)>) -> Self {
        self.assignments.extend(inputs);
        self
    }

    /// Set the settle window; 0 disables multi-press resolution
    pub fn short_press_threshold_ms(mut self, value: u32) -> Self {
        self.short_press_threshold_ms = value;
        self
    }

    /// Set the long-press hold time; 0 disables long presses
    pub fn long_press_threshold_ms(mut self, value: u32) -> Self {
        self.long_press_threshold_ms = value;
        self
    }

    /// Build the configuration
    ///
    /// Active-high inputs form the first scan group, active-low inputs the
    /// second. Empty groups are omitted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoInputs` if nothing was assigned and
    /// `ConfigError::DuplicateInput` if an input was assigned twice.
    pub fn build(self) -> Result<Config<I>, ConfigError<I>> {
        if self.assignments.is_empty() {
            return Err(ConfigError::NoInputs);
        }

        let mut seen: Vec<I> = Vec::with_capacity(self.assignments.len());
        for (input, _) in &self.assignments {
            if let Err(slot) = seen.binary_search(input) {
                seen.insert(slot, *input);
            } else {
                return Err(ConfigError::DuplicateInput { input: *input });
            }
        }

        let groups = [Polarity::ActiveHigh, Polarity::ActiveLow]
            .into_iter()
            .map(|polarity| ScanGroup {
                polarity,
                inputs: self
                    .assignments
                    .iter()
                    .filter(|(_, assigned)| *assigned == polarity)
                    .map(|(input, _)| *input)
                    .collect(),
            })
            .filter(|group| !group.is_empty())
            .collect();

        Ok(Config {
            short_press_threshold_ms: self.short_press_threshold_ms,
            long_press_threshold_ms: self.long_press_threshold_ms,
            groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_firmware_thresholds() {
        let config = Builder::new().input(1u8, Polarity::ActiveLow).build().unwrap();
        assert_eq!(config.short_press_threshold_ms, 500);
        assert_eq!(config.long_press_threshold_ms, 2000);
    }

    #[test]
    fn groups_partition_by_polarity() {
        let config = Builder::new()
            .inputs([
                (1u8, Polarity::ActiveLow),
                (2, Polarity::ActiveHigh),
                (3, Polarity::ActiveLow),
            ])
            .build()
            .unwrap();

        let groups = config.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].polarity(), Polarity::ActiveHigh);
        assert_eq!(groups[0].inputs(), &[2]);
        assert_eq!(groups[1].polarity(), Polarity::ActiveLow);
        assert_eq!(groups[1].inputs(), &[1, 3]);
    }

    #[test]
    fn single_polarity_yields_one_group() {
        let config = Builder::new()
            .input(7u8, Polarity::ActiveLow)
            .input(8, Polarity::ActiveLow)
            .build()
            .unwrap();
        assert_eq!(config.groups().len(), 1);
        assert_eq!(config.locate(&8), Some((0, 1)));
        assert_eq!(config.locate(&9), None);
    }

    #[test]
    fn duplicate_input_is_rejected() {
        let result = Builder::new()
            .input(1u8, Polarity::ActiveLow)
            .input(2, Polarity::ActiveLow)
            .input(1, Polarity::ActiveLow)
            .build();
        assert_eq!(result, Err(ConfigError::DuplicateInput { input: 1 }));
    }

    #[test]
    fn empty_builder_is_rejected() {
        assert_eq!(Builder::<u8>::new().build(), Err(ConfigError::NoInputs));
    }

    #[test]
    fn polarity_translates_levels() {
        assert!(Polarity::ActiveLow.is_pressed(false));
        assert!(!Polarity::ActiveLow.is_pressed(true));
        assert!(Polarity::ActiveHigh.is_pressed(true));
    }
}
