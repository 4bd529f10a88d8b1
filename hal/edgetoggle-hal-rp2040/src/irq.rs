//! Edge dispatch
//!
//! RP2040 GPIO interrupts are per bank, not per line, so the dispatcher
//! exposes one virtual interrupt number per line instead. Registering a
//! line lends its pin to an edge waiter; [`EdgeDispatcher::serve`] awaits
//! the hardware edge interrupt on it, applies the line's debounce window
//! and invokes the handler. Spawn one waiter task per possible
//! registration.

use core::cell::RefCell;

use embassy_futures::select::select;
use embassy_rp::gpio::Flex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::{Channel, TrySendError};
use embassy_sync::signal::Signal;
use embassy_time::Instant;
use heapless::Vec;

use edgetoggle_hal::{
    GpioSubsystem, InterruptController, IrqHandler, IrqNumber, IrqReturn, LineId, Trigger,
};

use crate::gpio::Rp2040Gpio;
use crate::pins::{index, LINE_COUNT};

/// Maximum number of simultaneous registrations
pub const MAX_BINDINGS: usize = 4;

/// `-EBUSY`: interrupt number already registered
const EBUSY: i32 = -16;
/// `-EINVAL`: interrupt number does not name a line
const EINVAL: i32 = -22;
/// `-ENOSPC`: registration table full
const ENOSPC: i32 = -28;

/// Post-edge quiet window
///
/// Edges arriving within the window of the last accepted one are bounce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebounceWindow {
    last_fire_ms: Option<u64>,
}

impl DebounceWindow {
    /// Window that accepts the next edge
    pub const fn new() -> Self {
        Self { last_fire_ms: None }
    }

    /// Check an edge seen at `now_ms`; returns true if the handler should run
    pub fn accept(&mut self, now_ms: u64, window_ms: u32) -> bool {
        if let Some(last) = self.last_fire_ms {
            if now_ms.saturating_sub(last) < window_ms as u64 {
                return false;
            }
        }

        self.last_fire_ms = Some(now_ms);
        true
    }
}

struct Registration {
    irq: IrqNumber,
    owner: &'static str,
    handler: &'static dyn IrqHandler,
    window: DebounceWindow,
}

/// Pin handed to a waiter for the lifetime of a registration
struct Lease {
    irq: IrqNumber,
    trigger: Trigger,
    pin: Flex<'static>,
}

/// Interrupt controller over GPIO edge interrupts
pub struct EdgeDispatcher {
    gpio: &'static Rp2040Gpio,
    registrations: Mutex<CriticalSectionRawMutex, RefCell<Vec<Registration, MAX_BINDINGS>>>,
    leases: Channel<CriticalSectionRawMutex, Lease, MAX_BINDINGS>,
    cancel: [Signal<CriticalSectionRawMutex, ()>; LINE_COUNT],
}

impl EdgeDispatcher {
    /// Create a dispatcher for lines of `gpio`
    pub const fn new(gpio: &'static Rp2040Gpio) -> Self {
        Self {
            gpio,
            registrations: Mutex::new(RefCell::new(Vec::new())),
            leases: Channel::new(),
            cancel: [const { Signal::new() }; LINE_COUNT],
        }
    }

    /// Wait for registrations and service their edges
    ///
    /// Each call serves one registration at a time: it waits on the lent
    /// pin until the registration is removed, gives the pin back and picks
    /// up the next one. Never returns.
    pub async fn serve(&self) {
        loop {
            let Lease {
                irq,
                trigger,
                mut pin,
            } = self.leases.receive().await;
            let line = irq as LineId;

            if let Some(cancel) = index(line).map(|i| &self.cancel[i]) {
                select(self.watch(irq, line, &mut pin, trigger), cancel.wait()).await;
            }

            self.gpio.restore(line, pin);
        }
    }

    async fn watch(&self, irq: IrqNumber, line: LineId, pin: &mut Flex<'static>, trigger: Trigger) {
        loop {
            let is_high = match trigger {
                Trigger::RisingEdge => {
                    pin.wait_for_rising_edge().await;
                    true
                }
                Trigger::FallingEdge => {
                    pin.wait_for_falling_edge().await;
                    false
                }
                Trigger::BothEdges => {
                    pin.wait_for_any_edge().await;
                    pin.is_high()
                }
            };
            self.gpio.note_level(line, is_high);
            self.fire(irq, Instant::now().as_millis());

            // Follow the line back to idle so level reads stay current
            match trigger {
                Trigger::RisingEdge => {
                    pin.wait_for_low().await;
                    self.gpio.note_level(line, false);
                }
                Trigger::FallingEdge => {
                    pin.wait_for_high().await;
                    self.gpio.note_level(line, true);
                }
                Trigger::BothEdges => {}
            }
        }
    }

    /// Run the handler for one edge on `irq` unless it is bounce
    ///
    /// The handler runs after the registration table is unlocked. Returns
    /// `None` if the edge was swallowed or `irq` is no longer registered.
    fn fire(&self, irq: IrqNumber, now_ms: u64) -> Option<IrqReturn> {
        let debounce_ms = self
            .gpio
            .inspect(irq as LineId)
            .map_or(0, |info| info.debounce_ms);

        let handler = self.registrations.lock(|cell| {
            let mut regs = cell.borrow_mut();
            let reg = regs.iter_mut().find(|r| r.irq == irq)?;
            reg.window
                .accept(now_ms, debounce_ms)
                .then_some(reg.handler)
        })?;

        Some(handler.handle(irq))
    }

    /// Owner tag of the registration on `irq`
    pub fn owner(&self, irq: IrqNumber) -> Option<&'static str> {
        self.registrations.lock(|cell| {
            cell.borrow()
                .iter()
                .find(|r| r.irq == irq)
                .map(|r| r.owner)
        })
    }

    /// Number of active registrations
    pub fn len(&self) -> usize {
        self.registrations.lock(|cell| cell.borrow().len())
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove(&self, irq: IrqNumber) -> bool {
        self.registrations.lock(|cell| {
            let mut regs = cell.borrow_mut();
            let before = regs.len();
            regs.retain(|r| r.irq != irq);
            regs.len() != before
        })
    }
}

impl InterruptController<'static> for EdgeDispatcher {
    type Binding = IrqNumber;

    fn register(
        &self,
        irq: IrqNumber,
        trigger: Trigger,
        owner: &'static str,
        handler: &'static dyn IrqHandler,
    ) -> Result<IrqNumber, i32> {
        let line = LineId::try_from(irq).map_err(|_| EINVAL)?;
        let slot = index(line)
            .filter(|_| self.gpio.is_valid(line))
            .ok_or(EINVAL)?;

        // A lent pin already has a waiter on it
        let pin = self.gpio.lend(line).ok_or(EBUSY)?;

        let added = self.registrations.lock(|cell| {
            let mut regs = cell.borrow_mut();
            if regs.iter().any(|r| r.irq == irq) {
                return Err(EBUSY);
            }
            regs.push(Registration {
                irq,
                owner,
                handler,
                window: DebounceWindow::new(),
            })
            .map_err(|_| ENOSPC)
        });
        if let Err(code) = added {
            self.gpio.restore(line, pin);
            return Err(code);
        }

        // Drop a cancel left over from an earlier registration
        self.cancel[slot].reset();

        if let Err(TrySendError::Full(lease)) = self.leases.try_send(Lease { irq, trigger, pin }) {
            self.remove(irq);
            self.gpio.restore(line, lease.pin);
            return Err(ENOSPC);
        }

        Ok(irq)
    }

    fn unregister(&self, binding: IrqNumber) {
        // Once removed, a waiter mid-wait finds nothing to call
        if self.remove(binding) {
            if let Some(i) = index(binding as LineId) {
                self.cancel[i].signal(());
            }
        }
    }
}
