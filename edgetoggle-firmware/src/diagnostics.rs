//! defmt rendering of controller diagnostics

use defmt::*;
use edgetoggle_core::{Diagnostic, DiagnosticSink, Severity};

/// Sink that logs every record over RTT
///
/// defmt only copies the record's fields into the RTT buffer, so this is
/// safe to call from the edge handler.
pub struct DefmtSink;

impl DiagnosticSink for DefmtSink {
    fn emit(&self, record: Diagnostic) {
        match record {
            Diagnostic::Loading => info!("Edge toggle controller loading"),
            Diagnostic::Edge {
                button,
                led,
                presses,
            } => info!(
                "Edge: button={} led={} presses={}",
                button, led, presses
            ),
            Diagnostic::Goodbye => info!("Edge toggle controller unloaded"),
            other => match other.severity() {
                Severity::Info => info!("{}", other),
                Severity::Warn => warn!("{}", other),
                Severity::Error => error!("{}", other),
            },
        }
    }
}
