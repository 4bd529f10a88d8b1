//! GPIO line table
//!
//! Tracks which lines are claimed, by whom, how they are configured and
//! whether they are exported. The claim bookkeeping lives in [`LineTable`]
//! and is independent of the pin drivers so it can be checked on the host.

use core::cell::RefCell;

use embassy_rp::gpio::{AnyPin, Flex, Pull};
use embassy_rp::Peri;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use edgetoggle_hal::{GpioError, GpioSubsystem, IrqNumber, Level, LineId};

use crate::pins::{index, LineError, LINE_COUNT};

/// Configured direction of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    #[default]
    Unconfigured,
    Input,
    Output,
}

/// Inspection view of one line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineInfo {
    /// Owner tag of the current claim
    pub owner: Option<&'static str>,
    pub direction: Direction,
    /// `Some(allow_direction_change)` while exported
    pub exported: Option<bool>,
    /// Debounce window applied by the edge dispatcher
    pub debounce_ms: u32,
    /// Pin is lent to an edge waiter
    pub bound: bool,
}

/// Claim bookkeeping for every line that has a pin behind it
pub struct LineTable {
    lines: [Option<LineInfo>; LINE_COUNT],
}

impl Default for LineTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LineTable {
    /// Create an empty table
    pub const fn new() -> Self {
        Self {
            lines: [None; LINE_COUNT],
        }
    }

    /// Make `line` available for claiming
    pub fn add(&mut self, line: LineId) -> Result<(), LineError> {
        let slot = index(line)
            .map(|i| &mut self.lines[i])
            .ok_or(LineError::InvalidLine)?;
        if slot.is_some() {
            return Err(LineError::AlreadyAdded);
        }
        *slot = Some(LineInfo::default());
        Ok(())
    }

    /// Check if `line` has a pin behind it
    pub fn is_available(&self, line: LineId) -> bool {
        self.get(line).is_some()
    }

    /// Current state of `line`
    pub fn get(&self, line: LineId) -> Option<LineInfo> {
        index(line).and_then(|i| self.lines[i])
    }

    /// Claim `line` for `owner`
    pub fn claim(&mut self, line: LineId, owner: &'static str) -> Result<(), GpioError> {
        let info = self.entry(line)?;
        if info.owner.is_some() {
            return Err(GpioError::Busy);
        }
        info.owner = Some(owner);
        Ok(())
    }

    /// Mutable state of a claimed line
    pub fn claimed(&mut self, line: LineId) -> Result<&mut LineInfo, GpioError> {
        let info = self.entry(line)?;
        if info.owner.is_none() {
            return Err(GpioError::NotClaimed);
        }
        Ok(info)
    }

    /// Drop the export flag; fails if the line is not exported
    pub fn unexport(&mut self, line: LineId) -> Result<(), GpioError> {
        self.claimed(line)?
            .exported
            .take()
            .map(|_| ())
            .ok_or(GpioError::NotClaimed)
    }

    /// Release the claim and reset the line's configuration
    pub fn release(&mut self, line: LineId) -> Result<(), GpioError> {
        let info = self.claimed(line)?;
        *info = LineInfo::default();
        Ok(())
    }

    fn entry(&mut self, line: LineId) -> Result<&mut LineInfo, GpioError> {
        index(line)
            .and_then(|i| self.lines[i].as_mut())
            .ok_or(GpioError::NoSuchLine)
    }
}

struct Inner {
    table: LineTable,
    pins: [Option<Flex<'static>>; LINE_COUNT],
    /// Last level seen by the waiter holding a lent pin
    lent_level: [Option<bool>; LINE_COUNT],
}

/// RP2040 GPIO subsystem
///
/// Every trait method takes the table lock for its duration, so the
/// subsystem can be shared between the main task and the edge dispatcher.
pub struct Rp2040Gpio {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Inner>>,
    input_pull: Pull,
}

impl Rp2040Gpio {
    /// Create an empty subsystem; inputs get `input_pull` when configured
    pub fn new(input_pull: Pull) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                table: LineTable::new(),
                pins: [const { None }; LINE_COUNT],
                lent_level: [None; LINE_COUNT],
            })),
            input_pull,
        }
    }

    /// Hand the pin for `line` to the table
    pub fn add_line(&self, line: LineId, pin: Peri<'static, AnyPin>) -> Result<(), LineError> {
        self.with(|inner| {
            inner.table.add(line)?;
            if let Some(i) = index(line) {
                inner.pins[i] = Some(Flex::new(pin));
            }
            Ok(())
        })
    }

    /// Inspection view of `line`
    pub fn inspect(&self, line: LineId) -> Option<LineInfo> {
        self.with(|inner| {
            let info = inner.table.get(line)?;
            let bound = index(line).is_some_and(|i| inner.lent_level[i].is_some());
            Some(LineInfo { bound, ..info })
        })
    }

    /// Take the pin of `line` for an edge waiter
    ///
    /// Until [`restore`](Self::restore), reads of the line return the level
    /// the waiter last reported and configuration changes fail with
    /// [`GpioError::Busy`].
    pub(crate) fn lend(&self, line: LineId) -> Option<Flex<'static>> {
        self.with(|inner| {
            let i = index(line)?;
            let pin = inner.pins[i].take()?;
            inner.lent_level[i] = Some(pin.is_high());
            Some(pin)
        })
    }

    /// Record the level a waiter observed on a lent pin
    pub(crate) fn note_level(&self, line: LineId, is_high: bool) {
        self.with(|inner| {
            if let Some(level) = index(line).and_then(|i| inner.lent_level[i].as_mut()) {
                *level = is_high;
            }
        })
    }

    /// Give a lent pin back
    pub(crate) fn restore(&self, line: LineId, pin: Flex<'static>) {
        self.with(|inner| {
            if let Some(i) = index(line) {
                inner.pins[i] = Some(pin);
                inner.lent_level[i] = None;
            }
        })
    }

    fn with<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Run `f` on the pin of a claimed line
    fn with_claimed<R>(
        &self,
        line: LineId,
        f: impl FnOnce(&mut LineInfo, &mut Flex<'static>) -> R,
    ) -> Result<R, GpioError> {
        self.with(|inner| {
            let info = inner.table.claimed(line)?;
            let i = index(line).ok_or(GpioError::NoSuchLine)?;
            if inner.lent_level[i].is_some() {
                return Err(GpioError::Busy);
            }
            let pin = inner.pins[i].as_mut().ok_or(GpioError::NoSuchLine)?;
            Ok(f(info, pin))
        })
    }
}

fn to_rp(level: Level) -> embassy_rp::gpio::Level {
    match level {
        Level::Low => embassy_rp::gpio::Level::Low,
        Level::High => embassy_rp::gpio::Level::High,
    }
}

impl GpioSubsystem for Rp2040Gpio {
    fn is_valid(&self, line: LineId) -> bool {
        self.with(|inner| inner.table.is_available(line))
    }

    fn request(&self, line: LineId, owner: &'static str) -> Result<(), GpioError> {
        self.with(|inner| inner.table.claim(line, owner))
    }

    fn set_direction_output(&self, line: LineId, level: Level) -> Result<(), GpioError> {
        self.with_claimed(line, |info, pin| {
            // Latch the level first so the pin never glitches to the old value
            pin.set_level(to_rp(level));
            pin.set_as_output();
            info.direction = Direction::Output;
        })
    }

    fn set_direction_input(&self, line: LineId) -> Result<(), GpioError> {
        let pull = self.input_pull;
        self.with_claimed(line, |info, pin| {
            pin.set_as_input();
            pin.set_pull(pull);
            info.direction = Direction::Input;
        })
    }

    fn set_debounce(&self, line: LineId, debounce_ms: u32) -> Result<(), GpioError> {
        self.with_claimed(line, |info, _| info.debounce_ms = debounce_ms)
    }

    fn get_value(&self, line: LineId) -> Level {
        self.with(|inner| {
            let Some(i) = index(line) else {
                return Level::Low;
            };
            match (&inner.pins[i], inner.lent_level[i]) {
                (Some(pin), _) => Level::from(pin.is_high()),
                (None, Some(is_high)) => Level::from(is_high),
                (None, None) => Level::Low,
            }
        })
    }

    fn set_value(&self, line: LineId, level: Level) {
        // Lent pins are inputs under a waiter; nothing to drive
        self.with(|inner| {
            if let Some(pin) = index(line).and_then(|i| inner.pins[i].as_mut()) {
                pin.set_level(to_rp(level));
            }
        })
    }

    fn export(&self, line: LineId, allow_direction_change: bool) -> Result<(), GpioError> {
        self.with(|inner| {
            let info = inner.table.claimed(line)?;
            if info.exported.is_some() {
                return Err(GpioError::Busy);
            }
            info.exported = Some(allow_direction_change);
            Ok(())
        })
    }

    fn unexport(&self, line: LineId) -> Result<(), GpioError> {
        self.with(|inner| inner.table.unexport(line))
    }

    fn free(&self, line: LineId) -> Result<(), GpioError> {
        self.with(|inner| inner.table.release(line))
    }

    fn to_irq(&self, line: LineId) -> Result<IrqNumber, GpioError> {
        // Every RP2040 GPIO can raise an edge event; the line number doubles
        // as the dispatcher's interrupt number
        if self.is_valid(line) {
            Ok(line as IrqNumber)
        } else {
            Err(GpioError::NoSuchLine)
        }
    }
}
