//! GPIO subsystem abstraction
//!
//! Models the host's per-line GPIO API: lines are addressed by number,
//! claimed under an owner tag, configured, and optionally exported to an
//! inspection namespace where external tools can observe them.
//!
//! All methods take `&self`. Line registers are hardware state that may be
//! touched from interrupt context, so implementations provide their own
//! interior mutability.

use core::ops::Not;

use crate::irq::IrqNumber;

/// Host line number
pub type LineId = u16;

/// Digital logic level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 0
    #[default]
    Low,
    /// Logic 1
    High,
}

impl Level {
    /// Check if this is logic 1
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }

    /// Check if this is logic 0
    pub const fn is_low(self) -> bool {
        !self.is_high()
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> Self {
        level.is_high()
    }
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// Errors reported by the GPIO subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioError {
    /// Line number does not exist on this host
    NoSuchLine,
    /// Line already claimed by another owner
    Busy,
    /// Line was not claimed (or already freed)
    NotClaimed,
    /// Operation not supported on this line (e.g. no debounce filter)
    NotSupported,
    /// Host-specific failure code
    Other(i32),
}

impl GpioError {
    /// Negative errno-style code for this error
    pub const fn code(self) -> i32 {
        match self {
            GpioError::NoSuchLine => -19,   // ENODEV
            GpioError::Busy => -16,         // EBUSY
            GpioError::NotClaimed => -22,   // EINVAL
            GpioError::NotSupported => -95, // EOPNOTSUPP
            GpioError::Other(code) => code,
        }
    }
}

/// Host GPIO subsystem
///
/// Implementations own the physical lines. The core claims lines through
/// [`request`](GpioSubsystem::request) and must hand them back with
/// [`free`](GpioSubsystem::free).
pub trait GpioSubsystem {
    /// Check whether `line` names a real line on this host
    fn is_valid(&self, line: LineId) -> bool;

    /// Claim `line` for exclusive use by `owner`
    fn request(&self, line: LineId, owner: &'static str) -> Result<(), GpioError>;

    /// Configure a claimed line as output, driving `level` immediately
    fn set_direction_output(&self, line: LineId, level: Level) -> Result<(), GpioError>;

    /// Configure a claimed line as input
    fn set_direction_input(&self, line: LineId) -> Result<(), GpioError>;

    /// Apply the debounce filter to an input line
    fn set_debounce(&self, line: LineId, debounce_ms: u32) -> Result<(), GpioError>;

    /// Read the current level of a line
    fn get_value(&self, line: LineId) -> Level;

    /// Drive an output line
    ///
    /// Must be callable from interrupt context: no blocking, no allocation.
    fn set_value(&self, line: LineId, level: Level);

    /// Make a claimed line visible in the inspection namespace
    ///
    /// When `allow_direction_change` is false, external users may read (and
    /// for outputs, write) the value but not flip the direction.
    fn export(&self, line: LineId, allow_direction_change: bool) -> Result<(), GpioError>;

    /// Remove a line from the inspection namespace
    fn unexport(&self, line: LineId) -> Result<(), GpioError>;

    /// Release the claim on a line
    fn free(&self, line: LineId) -> Result<(), GpioError>;

    /// Interrupt number raised by an input line
    fn to_irq(&self, line: LineId) -> Result<IrqNumber, GpioError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_bool() {
        assert_eq!(Level::from(true), Level::High);
        assert_eq!(Level::from(false), Level::Low);
        assert!(bool::from(Level::High));
        assert!(!bool::from(Level::Low));
    }

    #[test]
    fn test_level_not() {
        assert_eq!(!Level::High, Level::Low);
        assert_eq!(!Level::Low, Level::High);
        assert_eq!(!!Level::High, Level::High);
    }

    #[test]
    fn test_error_codes_are_negative() {
        let errors = [
            GpioError::NoSuchLine,
            GpioError::Busy,
            GpioError::NotClaimed,
            GpioError::NotSupported,
        ];

        for error in errors {
            assert!(error.code() < 0);
        }

        assert_eq!(GpioError::Other(-5).code(), -5);
    }
}
