//! Shared LED/press-count state
//!
//! Written by the edge handler in interrupt context, read by unload in
//! normal context. Both fields are atomics so the unload read is never torn,
//! even if an edge is still being serviced.

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

use edgetoggle_hal::Level;

/// Point-in-time copy of [`SharedState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StateSnapshot {
    pub led: Level,
    pub presses: u32,
}

/// LED flag and press counter
#[derive(Debug)]
pub struct SharedState {
    led_on: AtomicBool,
    presses: AtomicU32,
}

impl SharedState {
    /// Create state with the LED at `initial` and no presses
    pub const fn new(initial: Level) -> Self {
        Self {
            led_on: AtomicBool::new(initial.is_high()),
            presses: AtomicU32::new(0),
        }
    }

    /// Flip the LED flag, returning the new level
    ///
    /// Only the edge handler toggles, and the dispatcher serializes it, so
    /// relaxed ordering is enough.
    pub fn toggle(&self) -> Level {
        let was_on = self.led_on.fetch_xor(true, Ordering::Relaxed);
        Level::from(!was_on)
    }

    /// Force the LED flag to `level`
    pub fn force(&self, level: Level) {
        self.led_on.store(level.is_high(), Ordering::Relaxed);
    }

    /// Start over: LED flag at `level`, no presses
    pub fn reset(&self, level: Level) {
        self.led_on.store(level.is_high(), Ordering::Relaxed);
        self.presses.store(0, Ordering::Release);
    }

    /// Count one press, returning the new total
    ///
    /// Wraps at `u32::MAX`.
    pub fn record_press(&self) -> u32 {
        self.presses.fetch_add(1, Ordering::Release).wrapping_add(1)
    }

    /// Current LED flag
    pub fn led(&self) -> Level {
        Level::from(self.led_on.load(Ordering::Relaxed))
    }

    /// Presses counted so far
    pub fn presses(&self) -> u32 {
        self.presses.load(Ordering::Acquire)
    }

    /// Copy both fields
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            led: self.led(),
            presses: self.presses(),
        }
    }
}
