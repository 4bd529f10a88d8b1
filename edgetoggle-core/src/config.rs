//! Controller configuration
//!
//! The controller drives exactly one LED from exactly one button. Trigger
//! polarity and owner tags are fixed; line numbers, debounce and the LED's
//! power-on level are chosen per board.

use edgetoggle_hal::{Level, LineId, Trigger};

/// Owner tag used when claiming lines
pub const LINE_OWNER: &str = "sysfs";

/// Owner tag shown by the host for the interrupt registration
pub const IRQ_OWNER: &str = "gpio_handler";

/// Edge that toggles the LED (press, not release)
pub const TRIGGER: Trigger = Trigger::RisingEdge;

/// Default LED line (P9_23 on a BeagleBone)
pub const DEFAULT_LED_LINE: LineId = 49;

/// Default button line (P9_27 on a BeagleBone)
pub const DEFAULT_BUTTON_LINE: LineId = 115;

/// Default button debounce interval
pub const DEFAULT_DEBOUNCE_MS: u32 = 200;

/// Line assignment and power-on behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerConfig {
    /// Output line driving the LED
    pub led_line: LineId,
    /// Input line connected to the button
    pub button_line: LineId,
    /// Hardware debounce applied to the button line
    pub debounce_ms: u32,
    /// LED level right after load
    pub led_default: Level,
}

impl ControllerConfig {
    /// Create a config with the default debounce and the LED on at load
    pub const fn new(led_line: LineId, button_line: LineId) -> Self {
        Self {
            led_line,
            button_line,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            led_default: Level::High,
        }
    }

    /// Override the debounce interval
    pub const fn with_debounce_ms(mut self, debounce_ms: u32) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Override the LED level at load
    pub const fn with_led_default(mut self, level: Level) -> Self {
        self.led_default = level;
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LED_LINE, DEFAULT_BUTTON_LINE)
    }
}
