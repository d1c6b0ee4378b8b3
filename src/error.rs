//! Error taxonomy shared by the timer core and its GPIO collaborator
//!
//! Every fallible operation returns a [`HalResult`]. The legacy integer
//! status codes are still available through [`HalError::code`] for callers
//! that forward results over a C-style boundary.

use core::fmt;

/// Status code reported for a successful call
pub const SUCCESS: i32 = 0;

/// Result alias used across the HAL
pub type HalResult<T> = Result<T, HalError>;

/// Failure reported by a HAL operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HalError {
    /// Malformed call-site input (out-of-range index, zero duration, duty cycle outside 1..=99)
    InvalidArguments,
    /// An internal table lookup fell through; the slot state is inconsistent
    OutOfBoundary,
    /// `enable` on a timer that is already running
    AlreadyEnabled,
    /// `disable` on a timer that is already stopped
    AlreadyDisabled,
    /// The addressed timer slot has not been claimed with `init`
    NotInitialized,
    /// `init` on a slot that is already claimed
    AlreadyInitialized,
    /// The slot's mode cannot perform the request, or the timer is already running
    UnsupportedFeature,
    /// The configuration is well formed but names a capability the hardware lacks
    UnsupportedConfiguration,
}

impl HalError {
    /// Legacy integer status code
    ///
    /// `AlreadyEnabled` and `AlreadyDisabled` share the out-of-boundary code
    /// they were historically reported with.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::InvalidArguments => -1,
            Self::OutOfBoundary | Self::AlreadyEnabled | Self::AlreadyDisabled => -3,
            Self::NotInitialized => -4,
            Self::AlreadyInitialized => -5,
            Self::UnsupportedFeature => -6,
            Self::UnsupportedConfiguration => -7,
        }
    }

    /// True when the call was a no-op repeat of a state the timer is already in
    #[must_use]
    pub const fn is_idempotent(self) -> bool {
        matches!(self, Self::AlreadyEnabled | Self::AlreadyDisabled)
    }

    /// True for failures caused by the caller rather than by internal state
    #[must_use]
    pub const fn is_caller_error(self) -> bool {
        !matches!(self, Self::OutOfBoundary)
    }
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::InvalidArguments => "invalid arguments",
            Self::OutOfBoundary => "internal table lookup out of boundary",
            Self::AlreadyEnabled => "timer already enabled",
            Self::AlreadyDisabled => "timer already disabled",
            Self::NotInitialized => "timer not initialized",
            Self::AlreadyInitialized => "timer already initialized",
            Self::UnsupportedFeature => "feature unsupported in the configured mode",
            Self::UnsupportedConfiguration => "unsupported configuration",
        };
        f.write_str(text)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for HalError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::InvalidArguments => defmt::write!(f, "InvalidArguments"),
            Self::OutOfBoundary => defmt::write!(f, "OutOfBoundary"),
            Self::AlreadyEnabled => defmt::write!(f, "AlreadyEnabled"),
            Self::AlreadyDisabled => defmt::write!(f, "AlreadyDisabled"),
            Self::NotInitialized => defmt::write!(f, "NotInitialized"),
            Self::AlreadyInitialized => defmt::write!(f, "AlreadyInitialized"),
            Self::UnsupportedFeature => defmt::write!(f, "UnsupportedFeature"),
            Self::UnsupportedConfiguration => defmt::write!(f, "UnsupportedConfiguration"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Collapse a result into its legacy status code
#[must_use]
pub fn status_code<T>(result: &HalResult<T>) -> i32 {
    match result {
        Ok(_) => SUCCESS,
        Err(e) => e.code(),
    }
}
