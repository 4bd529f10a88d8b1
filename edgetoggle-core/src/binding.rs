//! Interrupt binding of the button line
//!
//! A binding owns the [`InputLine`] it is attached to. The line only comes
//! back out of [`unbind`], so it cannot be released while its interrupt is
//! still registered, and a second binding for the same line cannot exist.

use edgetoggle_hal::{GpioSubsystem, InterruptController, IrqHandler, IrqNumber};

use crate::config::{IRQ_OWNER, TRIGGER};
use crate::error::Error;
use crate::lines::InputLine;

/// An active rising-edge registration for an input line
#[derive(Debug)]
pub struct InterruptBinding<B> {
    irq: IrqNumber,
    line: InputLine,
    token: B,
}

impl<B> InterruptBinding<B> {
    /// Interrupt number the handler is registered on
    pub fn irq(&self) -> IrqNumber {
        self.irq
    }

    /// The bound input line
    pub fn line(&self) -> &InputLine {
        &self.line
    }
}

/// A failed [`bind`], returning the line to the caller
#[derive(Debug)]
pub struct Unbound {
    pub line: InputLine,
    pub error: Error,
}

/// Interrupt number for `line`
pub fn irq_for<G: GpioSubsystem>(gpio: &G, line: &InputLine) -> Result<IrqNumber, Error> {
    gpio.to_irq(line.id())
        .map_err(|_| Error::NoInterruptMapping { line: line.id() })
}

/// Register `handler` for rising edges of `irq`, taking over `line`
///
/// `irq` comes from [`irq_for`] on the same line.
pub fn bind<'h, I>(
    irqs: &I,
    line: InputLine,
    irq: IrqNumber,
    handler: &'h dyn IrqHandler,
) -> Result<InterruptBinding<I::Binding>, Unbound>
where
    I: InterruptController<'h>,
{
    match irqs.register(irq, TRIGGER, IRQ_OWNER, handler) {
        Ok(token) => Ok(InterruptBinding { irq, line, token }),
        Err(code) => Err(Unbound {
            line,
            error: Error::RegistrationFailed { code },
        }),
    }
}

/// Remove the registration and hand the line back
///
/// Once this returns the handler is not running and will not run again.
pub fn unbind<'h, I>(irqs: &I, binding: InterruptBinding<I::Binding>) -> InputLine
where
    I: InterruptController<'h>,
{
    let InterruptBinding { line, token, .. } = binding;
    irqs.unregister(token);
    line
}
