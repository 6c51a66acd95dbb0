//! Unified error type for ir433-tool.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (behind the `defmt` feature) for efficient
//! on-target logging.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Storage
    /// Slot index is outside the IR record table.
    SlotOutOfRange { slot: usize, capacity: usize },

    /// The slot holds no learned code.
    BlankSlot(usize),

    /// Flash read/write/erase failed.
    Storage,

    // Radio
    /// Replay requested before anything was captured.
    NothingCaptured,

    // Hardware
    /// A PWM channel rejected the duty cycle.
    Pwm,
}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, Error>;

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::SlotOutOfRange { slot, capacity } => {
                write!(f, "slot {} out of range (capacity {})", slot, capacity)
            }
            Error::BlankSlot(slot) => write!(f, "slot {} is blank", slot),
            Error::Storage => f.write_str("storage error"),
            Error::NothingCaptured => f.write_str("nothing captured"),
            Error::Pwm => f.write_str("pwm error"),
        }
    }
}

// Convenience conversions

impl From<embedded_hal::pwm::ErrorKind> for Error {
    fn from(_: embedded_hal::pwm::ErrorKind) -> Self {
        Error::Pwm
    }
}
