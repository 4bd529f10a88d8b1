//! Board wiring
//!
//! Raspberry Pi Pico: on-board LED on GPIO25, push-button between GPIO15
//! and 3V3 (pulled down, so a press is a rising edge).

use edgetoggle_core::ControllerConfig;
use embassy_rp::gpio::Pull;

/// On-board LED
pub const LED_LINE: u16 = 25;

/// Push-button input
pub const BUTTON_LINE: u16 = 15;

/// Pull applied to input lines
pub const INPUT_PULL: Pull = Pull::Down;

/// Status heartbeat period
pub const HEARTBEAT_SECS: u64 = 10;

/// Controller configuration for this board (200 ms debounce, LED on at load)
pub const fn controller_config() -> ControllerConfig {
    ControllerConfig::new(LED_LINE, BUTTON_LINE)
}
