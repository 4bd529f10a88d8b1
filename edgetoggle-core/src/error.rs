//! Load-time errors

use core::fmt;

use edgetoggle_hal::{GpioError, LineId};

/// Reasons the controller can fail to load
///
/// Every variant is fatal to load and never retried; by the time an error
/// is returned everything acquired before it has been released again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Line number does not name an available hardware line
    InvalidLine { line: LineId },
    /// A claim or configuration step on a line failed
    Gpio { line: LineId, error: GpioError },
    /// The button line cannot raise interrupts
    NoInterruptMapping { line: LineId },
    /// The interrupt controller refused the registration
    RegistrationFailed { code: i32 },
}

impl Error {
    /// Negative errno-style code reported as the load result
    pub const fn code(&self) -> i32 {
        match self {
            Error::InvalidLine { .. } => -19, // ENODEV
            Error::Gpio { error, .. } => error.code(),
            Error::NoInterruptMapping { .. } => -6, // ENXIO
            Error::RegistrationFailed { code } => *code,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidLine { line } => write!(f, "invalid GPIO line {}", line),
            Error::Gpio { line, error } => {
                write!(f, "GPIO line {} failed: {:?} ({})", line, error, error.code())
            }
            Error::NoInterruptMapping { line } => {
                write!(f, "GPIO line {} has no interrupt mapping", line)
            }
            Error::RegistrationFailed { code } => {
                write!(f, "interrupt registration failed ({})", code)
            }
        }
    }
}
