//! Pin hand-off by GPIO number
//!
//! The core addresses lines by number, so board pins are moved out of
//! `Peripherals` into the [`Rp2040Gpio`](crate::Rp2040Gpio) line table once
//! at startup and looked up by number afterwards.

use edgetoggle_hal::LineId;

/// Number of user GPIO lines on RP2040
pub const LINE_COUNT: usize = 30;

/// Error when adding a pin to the line table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line number out of range (0-29 valid)
    InvalidLine,
    /// A pin is already registered under this number
    AlreadyAdded,
}

/// Table index for `line`, if it names a real GPIO
pub const fn index(line: LineId) -> Option<usize> {
    if (line as usize) < LINE_COUNT {
        Some(line as usize)
    } else {
        None
    }
}

/// Move pins out of `Peripherals` into a line table
///
/// Evaluates to `Result<(), LineError>`; stops at the first failure.
///
/// ```ignore
/// let p = embassy_rp::init(Default::default());
/// let gpio = Rp2040Gpio::new(Pull::Down);
/// take_lines!(gpio, p, { 25 => PIN_25, 15 => PIN_15 })?;
/// ```
#[macro_export]
macro_rules! take_lines {
    ($gpio:expr, $p:expr, { $($line:literal => $pin:ident),+ $(,)? }) => {{
        let mut result: Result<(), $crate::LineError> = Ok(());
        $(
            if result.is_ok() {
                result = $gpio.add_line(
                    $line,
                    embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.$pin),
                );
            }
        )+
        result
    }};
}
