//! Interrupt controller abstraction
//!
//! A handler object is registered against an interrupt number and a trigger
//! condition. The controller invokes it from interrupt context, one call at
//! a time per registration.

/// Host interrupt number
pub type IrqNumber = u32;

/// Signal transition that raises the interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    /// Low to high
    RisingEdge,
    /// High to low
    FallingEdge,
    /// Either transition
    BothEdges,
}

impl Trigger {
    /// Check whether a transition from `was_high` to `is_high` fires this trigger
    pub const fn fires(self, was_high: bool, is_high: bool) -> bool {
        match self {
            Trigger::RisingEdge => !was_high && is_high,
            Trigger::FallingEdge => was_high && !is_high,
            Trigger::BothEdges => was_high != is_high,
        }
    }
}

/// Handler verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrqReturn {
    /// Interrupt was not raised by this handler's device
    None,
    /// Interrupt recognized and fully handled
    Handled,
}

/// Handler invoked from interrupt context
///
/// Implementations must not block, allocate, or wait on I/O.
pub trait IrqHandler {
    /// Service one occurrence of `irq`
    fn handle(&self, irq: IrqNumber) -> IrqReturn;
}

/// Host interrupt controller
///
/// `'h` is how long registered handlers are borrowed for. Hosts that keep
/// handlers in static tables implement this for `'static` only.
pub trait InterruptController<'h> {
    /// Token identifying one registration
    type Binding;

    /// Register `handler` for `irq`
    ///
    /// `owner` is a human-readable tag for diagnostics. Returns the host's
    /// (negative) error code if the interrupt cannot be claimed.
    fn register(
        &self,
        irq: IrqNumber,
        trigger: Trigger,
        owner: &'static str,
        handler: &'h dyn IrqHandler,
    ) -> Result<Self::Binding, i32>;

    /// Remove a registration
    ///
    /// When this returns, no invocation for the binding is running and none
    /// will start.
    fn unregister(&self, binding: Self::Binding);
}
