//! Edge handler
//!
//! Runs in interrupt context on every rising edge of the button line:
//! flips the LED, counts the press and reports the button level. Nothing
//! here blocks or allocates.

use edgetoggle_hal::{GpioSubsystem, IrqHandler, IrqNumber, IrqReturn, Level};

use crate::config::ControllerConfig;
use crate::diag::{Diagnostic, DiagnosticSink};
use crate::lines::LineManager;
use crate::state::SharedState;

/// Handler object registered with the interrupt controller
///
/// Owns the [`SharedState`]. The host places it somewhere that outlives the
/// registration (a `StaticCell` on firmware, a local in tests) and passes it
/// to [`Controller::load`](crate::Controller::load).
pub struct EdgeHandler<'a, G, D> {
    lines: LineManager<'a, G>,
    diag: &'a D,
    config: ControllerConfig,
    state: SharedState,
}

impl<'a, G: GpioSubsystem, D: DiagnosticSink> EdgeHandler<'a, G, D> {
    /// Create a handler for `config`, LED state at `config.led_default`
    pub fn new(gpio: &'a G, diag: &'a D, config: ControllerConfig) -> Self {
        Self {
            lines: LineManager::new(gpio),
            diag,
            config,
            state: SharedState::new(config.led_default),
        }
    }

    /// Service one rising edge
    ///
    /// The LED line is written in the same call that flips the flag, so the
    /// pin and [`SharedState`] never disagree once this returns.
    pub fn on_edge(&self) -> IrqReturn {
        let led = self.state.toggle();
        self.lines.set_output(self.config.led_line, led);
        let presses = self.state.record_press();

        self.diag.emit(Diagnostic::Edge {
            button: self.lines.level(self.config.button_line),
            led,
            presses,
        });

        IrqReturn::Handled
    }

    /// Shared LED/press state
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Line assignment this handler drives
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub(crate) fn lines(&self) -> LineManager<'a, G> {
        self.lines
    }

    pub(crate) fn diag(&self) -> &'a D {
        self.diag
    }

    /// Drive the LED to `level` outside interrupt context
    pub(crate) fn force_led(&self, level: Level) {
        self.state.force(level);
        self.lines.set_output(self.config.led_line, level);
    }
}

impl<G: GpioSubsystem, D: DiagnosticSink> IrqHandler for EdgeHandler<'_, G, D> {
    fn handle(&self, _irq: IrqNumber) -> IrqReturn {
        self.on_edge()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockHost, MockSink};
    use proptest::prelude::*;

    const LED: u16 = 49;
    const BUTTON: u16 = 115;

    fn config(led_default: Level) -> ControllerConfig {
        ControllerConfig::new(LED, BUTTON).with_led_default(led_default)
    }

    #[test]
    fn test_edge_toggles_and_counts() {
        let host = MockHost::new(&[LED, BUTTON]);
        let sink = MockSink::new();
        let handler = EdgeHandler::new(&host, &sink, config(Level::High));

        assert_eq!(handler.on_edge(), IrqReturn::Handled);

        assert_eq!(handler.state().led(), Level::Low);
        assert_eq!(handler.state().presses(), 1);
        assert_eq!(host.level(LED), Level::Low);
    }

    #[test]
    fn test_edge_reports_button_level() {
        let host = MockHost::new(&[LED, BUTTON]);
        let sink = MockSink::new();
        let handler = EdgeHandler::new(&host, &sink, config(Level::High));

        host.drive(BUTTON, Level::High);
        handler.on_edge();

        assert_eq!(
            sink.last(),
            Some(Diagnostic::Edge {
                button: Level::High,
                led: Level::Low,
                presses: 1
            })
        );
    }

    #[test]
    fn test_pin_follows_flag_every_edge() {
        let host = MockHost::new(&[LED, BUTTON]);
        let sink = MockSink::new();
        let handler = EdgeHandler::new(&host, &sink, config(Level::Low));

        for _ in 0..5 {
            handler.on_edge();
            assert_eq!(host.level(LED), handler.state().led());
        }
    }

    #[test]
    fn test_dispatch_through_trait_object() {
        let host = MockHost::new(&[LED, BUTTON]);
        let sink = MockSink::new();
        let handler = EdgeHandler::new(&host, &sink, config(Level::High));

        let object: &dyn IrqHandler = &handler;
        assert_eq!(object.handle(0), IrqReturn::Handled);
        assert_eq!(handler.state().presses(), 1);
    }

    proptest! {
        #[test]
        fn prop_led_parity_matches_edge_count(initial in any::<bool>(), edges in 0u32..64) {
            let host = MockHost::new(&[LED, BUTTON]);
            let sink = MockSink::new();
            let handler = EdgeHandler::new(&host, &sink, config(Level::from(initial)));

            for _ in 0..edges {
                handler.on_edge();
            }

            let expected = Level::from(initial ^ (edges % 2 == 1));
            prop_assert_eq!(handler.state().led(), expected);
            prop_assert_eq!(handler.state().presses(), edges);
            prop_assert_eq!(sink.count_edges(), edges as usize);
        }
    }
}
