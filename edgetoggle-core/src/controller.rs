//! Load/unload orchestration
//!
//! Load claims the LED, then the button, then binds the button interrupt.
//! Any failure unwinds what was claimed in reverse order and returns the
//! originating error, so the controller is either fully running or fully
//! absent. Unload cannot fail: release problems are reported as
//! diagnostics and teardown carries on.

use heapless::Vec;

use edgetoggle_hal::{GpioSubsystem, InterruptController, Level, LineId};

use crate::binding::{self, InterruptBinding, Unbound};
use crate::diag::{Diagnostic, DiagnosticSink};
use crate::error::Error;
use crate::handler::EdgeHandler;
use crate::lines::{LineManager, OutputLine, ProvisionError};

/// Lines claimed during load
const MAX_CLAIMS: usize = 2;

/// What unload observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FinalState {
    /// Presses counted while loaded
    pub presses: u32,
    /// Button level sampled at the start of unload
    pub button: Level,
    /// LED level left on the pin
    pub led: Level,
    /// Release steps that failed
    pub release_failures: u8,
}

/// LIFO record of claimed lines, released on drop unless committed
struct Rollback<'a, G: GpioSubsystem, D: DiagnosticSink> {
    lines: LineManager<'a, G>,
    diag: &'a D,
    claims: Vec<LineId, MAX_CLAIMS>,
}

impl<'a, G: GpioSubsystem, D: DiagnosticSink> Rollback<'a, G, D> {
    fn new(lines: LineManager<'a, G>, diag: &'a D) -> Self {
        Self {
            lines,
            diag,
            claims: Vec::new(),
        }
    }

    fn push(&mut self, line: LineId) {
        let pushed = self.claims.push(line);
        debug_assert!(pushed.is_ok(), "rollback stack full");
        if let Err(line) = pushed {
            // No slot to defer it to; give it back now
            if let Err(error) = self.lines.release_line(line) {
                self.diag.emit(Diagnostic::ReleaseFailed { line, error });
            }
        }
    }

    /// Load succeeded; keep everything
    fn commit(mut self) {
        self.claims.clear();
    }
}

impl<G: GpioSubsystem, D: DiagnosticSink> Drop for Rollback<'_, G, D> {
    fn drop(&mut self) {
        if self.claims.is_empty() {
            return;
        }

        self.diag.emit(Diagnostic::RollingBack {
            claims: self.claims.len(),
        });

        while let Some(line) = self.claims.pop() {
            if let Err(error) = self.lines.release_line(line) {
                self.diag.emit(Diagnostic::ReleaseFailed { line, error });
            }
        }
    }
}

/// A loaded controller
///
/// Holds the LED line and the button binding for as long as it lives.
/// Dropping it without [`unload`](Controller::unload) leaves the hardware
/// claimed, as a module that is never unloaded would.
pub struct Controller<'a, G, I, D>
where
    I: InterruptController<'a>,
{
    handler: &'a EdgeHandler<'a, G, D>,
    irqs: &'a I,
    led: OutputLine,
    binding: InterruptBinding<I::Binding>,
}

impl<'a, G, I, D> Controller<'a, G, I, D>
where
    G: GpioSubsystem + 'a,
    I: InterruptController<'a>,
    D: DiagnosticSink + 'a,
{
    /// Claim both lines and bind `handler` to the button interrupt
    pub fn load(handler: &'a EdgeHandler<'a, G, D>, irqs: &'a I) -> Result<Self, Error> {
        let config = *handler.config();
        let lines = handler.lines();
        let diag = handler.diag();

        diag.emit(Diagnostic::Loading);

        let mut rollback = Rollback::new(lines, diag);

        let led = lines
            .provision_output(config.led_line, config.led_default)
            .map_err(|e| report_provision(diag, e))?;
        rollback.push(led.id());

        let button = lines
            .provision_input(config.button_line, config.debounce_ms)
            .map_err(|e| report_provision(diag, e))?;
        rollback.push(button.id());

        diag.emit(Diagnostic::ButtonLevel {
            level: lines.level(button.id()),
        });

        // Both lines are ours now; nothing carries over from an earlier load
        handler.state().reset(config.led_default);

        let irq = binding::irq_for(lines.gpio(), &button).map_err(|e| report(diag, e))?;
        diag.emit(Diagnostic::IrqMapped {
            line: config.button_line,
            irq,
        });

        let binding = match binding::bind(irqs, button, irq, handler) {
            Ok(binding) => binding,
            Err(Unbound { error, .. }) => {
                if let Error::RegistrationFailed { code } = error {
                    diag.emit(Diagnostic::Registration { code });
                }
                return Err(report(diag, error));
            }
        };
        diag.emit(Diagnostic::Registration { code: 0 });

        rollback.commit();

        Ok(Self {
            handler,
            irqs,
            led,
            binding,
        })
    }

    /// Presses counted so far
    pub fn presses(&self) -> u32 {
        self.handler.state().presses()
    }

    /// Current LED level
    pub fn led_level(&self) -> Level {
        self.handler.state().led()
    }

    /// Interrupt number the button is bound to
    pub fn irq(&self) -> edgetoggle_hal::IrqNumber {
        self.binding.irq()
    }

    /// Tear down: unbind, switch the LED off, release both lines
    ///
    /// The interrupt is unregistered before either line is touched, so no
    /// edge can be serviced against a released line.
    pub fn unload(self) -> FinalState {
        let Self {
            handler,
            irqs,
            led,
            binding,
        } = self;
        let lines = handler.lines();
        let diag = handler.diag();

        let button_level = lines.level(binding.line().id());
        diag.emit(Diagnostic::UnloadButtonLevel {
            level: button_level,
        });

        let button = binding::unbind(irqs, binding);

        // Read after unbind so no edge can still be counting
        let presses = handler.state().presses();
        diag.emit(Diagnostic::PressTotal { presses });

        handler.force_led(Level::Low);

        let mut release_failures = 0u8;
        for (line, result) in [
            (led.id(), lines.release(led)),
            (button.id(), lines.release(button)),
        ] {
            if let Err(error) = result {
                release_failures = release_failures.saturating_add(1);
                diag.emit(Diagnostic::ReleaseFailed { line, error });
            }
        }

        diag.emit(Diagnostic::Goodbye);

        FinalState {
            presses,
            button: button_level,
            led: handler.state().led(),
            release_failures,
        }
    }
}

/// Report a failed provision, including a line it could not give back
fn report_provision<D: DiagnosticSink>(diag: &D, failure: ProvisionError) -> Error {
    let error = report(diag, failure.error);
    if let (Some(release), Error::Gpio { line, .. }) = (failure.release, error) {
        diag.emit(Diagnostic::ReleaseFailed {
            line,
            error: release,
        });
    }
    error
}

/// Emit the diagnostic matching a load error and pass the error on
///
/// Registration failures are reported with their code at the bind site.
fn report<D: DiagnosticSink>(diag: &D, error: Error) -> Error {
    let record = match error {
        Error::InvalidLine { line } => Diagnostic::InvalidLine { line },
        Error::Gpio { line, error } => Diagnostic::LineFault { line, error },
        Error::NoInterruptMapping { line } => Diagnostic::NoIrqMapping { line },
        Error::RegistrationFailed { .. } => return error,
    };
    diag.emit(record);
    error
}
