//! Error types for building a classifier configuration
//!
//! Classification itself never fails: unmatched releases, unbound actions and
//! out-of-range event indices are dropped. The only error surface is
//! construction, where the scan-group partition is validated.
//!
//! ## Example
//!
//! ```
//! use button_actions::{Builder, ConfigError, Polarity};
//!
//! // Nothing configured
//! let result = Builder::<u8>::new().build();
//! assert!(matches!(result, Err(ConfigError::NoInputs)));
//!
//! // Same input in two scan groups
//! let result = Builder::new()
//!     .input(3u8, Polarity::ActiveLow)
//!     .input(3u8, Polarity::ActiveHigh)
//!     .build();
//! assert!(matches!(result, Err(ConfigError::DuplicateInput { .. })));
//! ```

use core::fmt::Debug;

/// Errors that can occur when building configuration
///
/// Both variants describe a broken scan-group partition: every configured
/// input must belong to exactly one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError<I> {
    /// No inputs were configured, so every scan group would be empty
    NoInputs,
    /// An input was assigned more than once
    ///
    /// Assigning the same input twice (with the same or a different polarity)
    /// would place it in two groups, or twice in one group.
    DuplicateInput {
        /// The offending input
        input: I,
    },
}

impl<I: Debug> core::fmt::Display for ConfigError<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::NoInputs => write!(f, "At least one input must be configured"),
            ConfigError::DuplicateInput { input } => {
                write!(f, "Input {input:?} is assigned to more than one scan group")
            }
        }
    }
}

impl<I: Debug> core::error::Error for ConfigError<I> {}
