//! Diagnostic records
//!
//! The controller reports what it does as typed records rather than
//! formatted strings. The host decides how to render them (defmt on the
//! firmware, a recording buffer in tests).

use edgetoggle_hal::{GpioError, IrqNumber, Level, LineId};

/// Record severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// Something the controller wants the host to know about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Diagnostic {
    /// Load sequence started
    Loading,
    /// A configured line does not exist
    InvalidLine { line: LineId },
    /// A claim/configure step failed on a line
    LineFault { line: LineId, error: GpioError },
    /// Button level sampled during load
    ButtonLevel { level: Level },
    /// Button line resolved to an interrupt number
    IrqMapped { line: LineId, irq: IrqNumber },
    /// Button line has no interrupt
    NoIrqMapping { line: LineId },
    /// Interrupt registration result (0 on success)
    Registration { code: i32 },
    /// Load failed after acquiring `claims` lines; releasing them
    RollingBack { claims: usize },
    /// One rising edge serviced
    Edge {
        button: Level,
        led: Level,
        presses: u32,
    },
    /// Button level sampled during unload
    UnloadButtonLevel { level: Level },
    /// Total presses seen while loaded
    PressTotal { presses: u32 },
    /// Releasing a line failed; unload continues
    ReleaseFailed { line: LineId, error: GpioError },
    /// Unload finished
    Goodbye,
}

impl Diagnostic {
    /// How loud this record is
    pub const fn severity(&self) -> Severity {
        match self {
            Diagnostic::InvalidLine { .. }
            | Diagnostic::LineFault { .. }
            | Diagnostic::NoIrqMapping { .. } => Severity::Error,
            Diagnostic::Registration { code } if *code != 0 => Severity::Error,
            Diagnostic::RollingBack { .. } | Diagnostic::ReleaseFailed { .. } => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

/// Destination for diagnostic records
///
/// `emit` is called from interrupt context for [`Diagnostic::Edge`], so
/// implementations must not block.
pub trait DiagnosticSink {
    /// Accept one record
    fn emit(&self, record: Diagnostic);
}
