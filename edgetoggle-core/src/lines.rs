//! Line resource manager
//!
//! Claims the LED and button lines, configures them, exports them to the
//! host's inspection namespace and gives them back. Holds no state of its
//! own beyond the GPIO subsystem reference: a line is claimed for as long as
//! its [`OutputLine`]/[`InputLine`] value exists.

use edgetoggle_hal::{GpioError, GpioSubsystem, Level, LineId};

use crate::config::LINE_OWNER;
use crate::error::Error;

/// A claimed, exported output line
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputLine {
    line: LineId,
}

impl OutputLine {
    /// Host line number
    pub fn id(&self) -> LineId {
        self.line
    }
}

/// A claimed, exported, debounced input line
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputLine {
    line: LineId,
    debounce_ms: u32,
}

impl InputLine {
    /// Host line number
    pub fn id(&self) -> LineId {
        self.line
    }

    /// Debounce interval applied at provisioning
    pub fn debounce_ms(&self) -> u32 {
        self.debounce_ms
    }
}

/// A failed provision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProvisionError {
    /// What went wrong
    pub error: Error,
    /// Freeing the half-configured line failed too; it is still claimed
    pub release: Option<GpioError>,
}

impl From<Error> for ProvisionError {
    fn from(error: Error) -> Self {
        Self {
            error,
            release: None,
        }
    }
}

/// A provisioned line that can be handed back with [`LineManager::release`]
pub trait Provisioned {
    /// Host line number
    fn line(&self) -> LineId;
}

impl Provisioned for OutputLine {
    fn line(&self) -> LineId {
        self.line
    }
}

impl Provisioned for InputLine {
    fn line(&self) -> LineId {
        self.line
    }
}

/// Claims and releases lines on a GPIO subsystem
pub struct LineManager<'a, G> {
    gpio: &'a G,
}

// Manual impls: `G` itself need not be Clone
impl<G> Clone for LineManager<'_, G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G> Copy for LineManager<'_, G> {}

impl<'a, G: GpioSubsystem> LineManager<'a, G> {
    /// Create a manager over `gpio`
    pub fn new(gpio: &'a G) -> Self {
        Self { gpio }
    }

    /// Claim `line` as an output driven to `initial`
    ///
    /// The line is exported with direction changes disabled. On return the
    /// pin is already at `initial`.
    pub fn provision_output(
        &self,
        line: LineId,
        initial: Level,
    ) -> Result<OutputLine, ProvisionError> {
        self.claim(line)?;

        let configured = self
            .gpio
            .set_direction_output(line, initial)
            .and_then(|()| self.gpio.export(line, false));

        match configured {
            Ok(()) => Ok(OutputLine { line }),
            Err(error) => Err(self.abandon(line, error)),
        }
    }

    /// Claim `line` as a debounced input
    pub fn provision_input(
        &self,
        line: LineId,
        debounce_ms: u32,
    ) -> Result<InputLine, ProvisionError> {
        self.claim(line)?;

        let configured = self
            .gpio
            .set_direction_input(line)
            .and_then(|()| self.gpio.set_debounce(line, debounce_ms))
            .and_then(|()| self.gpio.export(line, false));

        match configured {
            Ok(()) => Ok(InputLine { line, debounce_ms }),
            Err(error) => Err(self.abandon(line, error)),
        }
    }

    pub(crate) fn gpio(&self) -> &'a G {
        self.gpio
    }

    /// Drive the LED line
    ///
    /// No validation: runs in interrupt context and the caller guarantees
    /// the line is claimed as output.
    #[inline]
    pub fn set_output(&self, line: LineId, level: Level) {
        self.gpio.set_value(line, level);
    }

    /// Current level of a line
    #[inline]
    pub fn level(&self, line: LineId) -> Level {
        self.gpio.get_value(line)
    }

    /// Unexport and free a provisioned line
    ///
    /// Both steps are always attempted; the first failure is returned.
    pub fn release<L: Provisioned>(&self, line: L) -> Result<(), GpioError> {
        self.release_line(line.line())
    }

    /// Unexport and free by line number
    pub(crate) fn release_line(&self, line: LineId) -> Result<(), GpioError> {
        let unexported = self.gpio.unexport(line);
        let freed = self.gpio.free(line);
        unexported.and(freed)
    }

    fn claim(&self, line: LineId) -> Result<(), Error> {
        if !self.gpio.is_valid(line) {
            return Err(Error::InvalidLine { line });
        }

        self.gpio
            .request(line, LINE_OWNER)
            .map_err(|error| Error::Gpio { line, error })
    }

    /// Undo a half-finished provision after `error`
    fn abandon(&self, line: LineId, error: GpioError) -> ProvisionError {
        // Unexport of a line that never got exported fails; only the free matters
        let _ = self.gpio.unexport(line);
        ProvisionError {
            error: Error::Gpio { line, error },
            release: self.gpio.free(line).err(),
        }
    }
}
