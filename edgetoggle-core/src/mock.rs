//! Recording host doubles for tests
//!
//! `MockHost` plays both the GPIO subsystem and the interrupt controller,
//! journals every mutating call in order and counts lifetime violations
//! (writes to unclaimed lines, freeing a line whose interrupt is still
//! registered).

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::vec::Vec;

use edgetoggle_hal::{
    GpioError, GpioSubsystem, InterruptController, IrqHandler, IrqNumber, IrqReturn, Level, LineId,
    Trigger,
};

use crate::diag::{Diagnostic, DiagnosticSink};

/// Interrupt numbers are `IRQ_BASE + line`
pub const IRQ_BASE: IrqNumber = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Request(LineId),
    Output(LineId, Level),
    Input(LineId),
    Debounce(LineId, u32),
    Set(LineId, Level),
    Export(LineId, bool),
    Unexport(LineId),
    Free(LineId),
    Register(IrqNumber),
    Unregister(IrqNumber),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Unconfigured,
    Input,
    Output,
}

#[derive(Debug, Clone, Copy)]
struct MockLine {
    owner: Option<&'static str>,
    mode: Mode,
    level: Level,
    debounce: Option<u32>,
    exported: Option<bool>,
    has_irq: bool,
}

impl MockLine {
    fn new() -> Self {
        Self {
            owner: None,
            mode: Mode::Unconfigured,
            level: Level::Low,
            debounce: None,
            exported: None,
            has_irq: true,
        }
    }
}

#[derive(Default)]
struct Faults {
    request: BTreeMap<LineId, GpioError>,
    debounce: BTreeMap<LineId, GpioError>,
    export: BTreeMap<LineId, GpioError>,
    unexport: BTreeMap<LineId, GpioError>,
    free: BTreeMap<LineId, GpioError>,
    register: Option<i32>,
}

struct Registration<'h> {
    irq: IrqNumber,
    trigger: Trigger,
    owner: &'static str,
    handler: &'h dyn IrqHandler,
}

pub struct MockHost<'h> {
    lines: RefCell<BTreeMap<LineId, MockLine>>,
    calls: RefCell<Vec<Call>>,
    faults: RefCell<Faults>,
    registrations: RefCell<Vec<Registration<'h>>>,
    violations: Cell<usize>,
}

impl<'h> MockHost<'h> {
    pub fn new(valid: &[LineId]) -> Self {
        Self {
            lines: RefCell::new(valid.iter().map(|&l| (l, MockLine::new())).collect()),
            calls: RefCell::new(Vec::new()),
            faults: RefCell::new(Faults::default()),
            registrations: RefCell::new(Vec::new()),
            violations: Cell::new(0),
        }
    }

    // Fault injection

    pub fn fail_request(&self, line: LineId, error: GpioError) {
        self.faults.borrow_mut().request.insert(line, error);
    }

    pub fn fail_debounce(&self, line: LineId, error: GpioError) {
        self.faults.borrow_mut().debounce.insert(line, error);
    }

    pub fn fail_export(&self, line: LineId, error: GpioError) {
        self.faults.borrow_mut().export.insert(line, error);
    }

    pub fn fail_unexport(&self, line: LineId, error: GpioError) {
        self.faults.borrow_mut().unexport.insert(line, error);
    }

    pub fn fail_free(&self, line: LineId, error: GpioError) {
        self.faults.borrow_mut().free.insert(line, error);
    }

    pub fn refuse_irq(&self, code: i32) {
        self.faults.borrow_mut().register = Some(code);
    }

    pub fn unmap_irq(&self, line: LineId) {
        if let Some(l) = self.lines.borrow_mut().get_mut(&line) {
            l.has_irq = false;
        }
    }

    // Stimulus

    /// Set the level seen on an input line
    pub fn drive(&self, line: LineId, level: Level) {
        if let Some(l) = self.lines.borrow_mut().get_mut(&line) {
            l.level = level;
        }
    }

    /// Press and release the button, dispatching the rising edge
    pub fn press(&self, line: LineId) -> Option<IrqReturn> {
        self.drive(line, Level::High);
        let result = self.dispatch(IRQ_BASE + line as IrqNumber, false, true);
        self.drive(line, Level::Low);
        result
    }

    fn dispatch(&self, irq: IrqNumber, was_high: bool, is_high: bool) -> Option<IrqReturn> {
        // Copy the handler out so it can call back into the host
        let handler = self
            .registrations
            .borrow()
            .iter()
            .find(|r| r.irq == irq && r.trigger.fires(was_high, is_high))
            .map(|r| r.handler)?;
        Some(handler.handle(irq))
    }

    // Inspection

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn position(&self, call: Call) -> Option<usize> {
        self.calls.borrow().iter().position(|c| *c == call)
    }

    pub fn owner(&self, line: LineId) -> Option<&'static str> {
        self.line(line).and_then(|l| l.owner)
    }

    pub fn is_claimed(&self, line: LineId) -> bool {
        self.owner(line).is_some()
    }

    pub fn mode(&self, line: LineId) -> Mode {
        self.line(line).map_or(Mode::Unconfigured, |l| l.mode)
    }

    pub fn level(&self, line: LineId) -> Level {
        self.line(line).map_or(Level::Low, |l| l.level)
    }

    pub fn debounce(&self, line: LineId) -> Option<u32> {
        self.line(line).and_then(|l| l.debounce)
    }

    /// `Some(allow_direction_change)` while exported
    pub fn exported(&self, line: LineId) -> Option<bool> {
        self.line(line).and_then(|l| l.exported)
    }

    pub fn registrations(&self, irq: IrqNumber) -> usize {
        self.registrations
            .borrow()
            .iter()
            .filter(|r| r.irq == irq)
            .count()
    }

    pub fn registration(&self, irq: IrqNumber) -> Option<(Trigger, &'static str)> {
        self.registrations
            .borrow()
            .iter()
            .find(|r| r.irq == irq)
            .map(|r| (r.trigger, r.owner))
    }

    pub fn violations(&self) -> usize {
        self.violations.get()
    }

    fn line(&self, line: LineId) -> Option<MockLine> {
        self.lines.borrow().get(&line).copied()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn violation(&self) {
        self.violations.set(self.violations.get() + 1);
    }

    fn with_claimed<R>(
        &self,
        line: LineId,
        f: impl FnOnce(&mut MockLine) -> R,
    ) -> Result<R, GpioError> {
        let mut lines = self.lines.borrow_mut();
        let l = lines.get_mut(&line).ok_or(GpioError::NoSuchLine)?;
        if l.owner.is_none() {
            return Err(GpioError::NotClaimed);
        }
        Ok(f(l))
    }

    fn injected(&self, pick: impl FnOnce(&Faults) -> Option<GpioError>) -> Result<(), GpioError> {
        match pick(&self.faults.borrow()) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl GpioSubsystem for MockHost<'_> {
    fn is_valid(&self, line: LineId) -> bool {
        self.lines.borrow().contains_key(&line)
    }

    fn request(&self, line: LineId, owner: &'static str) -> Result<(), GpioError> {
        self.record(Call::Request(line));
        self.injected(|f| f.request.get(&line).copied())?;

        let mut lines = self.lines.borrow_mut();
        let l = lines.get_mut(&line).ok_or(GpioError::NoSuchLine)?;
        if l.owner.is_some() {
            return Err(GpioError::Busy);
        }
        l.owner = Some(owner);
        Ok(())
    }

    fn set_direction_output(&self, line: LineId, level: Level) -> Result<(), GpioError> {
        self.record(Call::Output(line, level));
        self.with_claimed(line, |l| {
            l.mode = Mode::Output;
            l.level = level;
        })
    }

    fn set_direction_input(&self, line: LineId) -> Result<(), GpioError> {
        self.record(Call::Input(line));
        self.with_claimed(line, |l| l.mode = Mode::Input)
    }

    fn set_debounce(&self, line: LineId, debounce_ms: u32) -> Result<(), GpioError> {
        self.record(Call::Debounce(line, debounce_ms));
        self.injected(|f| f.debounce.get(&line).copied())?;
        self.with_claimed(line, |l| l.debounce = Some(debounce_ms))
    }

    fn get_value(&self, line: LineId) -> Level {
        self.level(line)
    }

    fn set_value(&self, line: LineId, level: Level) {
        self.record(Call::Set(line, level));
        if !self.is_claimed(line) {
            self.violation();
        }
        self.drive(line, level);
    }

    fn export(&self, line: LineId, allow_direction_change: bool) -> Result<(), GpioError> {
        self.record(Call::Export(line, allow_direction_change));
        self.injected(|f| f.export.get(&line).copied())?;
        self.with_claimed(line, |l| l.exported = Some(allow_direction_change))
    }

    fn unexport(&self, line: LineId) -> Result<(), GpioError> {
        self.record(Call::Unexport(line));
        self.injected(|f| f.unexport.get(&line).copied())?;
        self.with_claimed(line, |l| l.exported.take())?
            .map(|_| ())
            .ok_or(GpioError::NotClaimed)
    }

    fn free(&self, line: LineId) -> Result<(), GpioError> {
        self.record(Call::Free(line));
        if self.registrations(IRQ_BASE + line as IrqNumber) > 0 {
            self.violation();
        }
        self.injected(|f| f.free.get(&line).copied())?;
        self.with_claimed(line, |l| {
            l.owner = None;
            l.exported = None;
            l.debounce = None;
            l.mode = Mode::Unconfigured;
        })
    }

    fn to_irq(&self, line: LineId) -> Result<IrqNumber, GpioError> {
        match self.line(line) {
            Some(l) if l.has_irq => Ok(IRQ_BASE + line as IrqNumber),
            Some(_) => Err(GpioError::NotSupported),
            None => Err(GpioError::NoSuchLine),
        }
    }
}

impl<'h> InterruptController<'h> for MockHost<'h> {
    type Binding = IrqNumber;

    fn register(
        &self,
        irq: IrqNumber,
        trigger: Trigger,
        owner: &'static str,
        handler: &'h dyn IrqHandler,
    ) -> Result<IrqNumber, i32> {
        self.record(Call::Register(irq));
        if let Some(code) = self.faults.borrow().register {
            return Err(code);
        }
        if self.registrations(irq) > 0 {
            return Err(-16); // EBUSY
        }
        self.registrations.borrow_mut().push(Registration {
            irq,
            trigger,
            owner,
            handler,
        });
        Ok(irq)
    }

    fn unregister(&self, binding: IrqNumber) {
        self.record(Call::Unregister(binding));
        self.registrations.borrow_mut().retain(|r| r.irq != binding);
    }
}

/// Diagnostic sink that keeps every record
pub struct MockSink {
    records: RefCell<Vec<Diagnostic>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            records: RefCell::new(Vec::new()),
        }
    }

    pub fn contains(&self, record: Diagnostic) -> bool {
        self.records.borrow().contains(&record)
    }

    pub fn position(&self, record: Diagnostic) -> Option<usize> {
        self.records.borrow().iter().position(|r| *r == record)
    }

    pub fn first(&self) -> Option<Diagnostic> {
        self.records.borrow().first().copied()
    }

    pub fn last(&self) -> Option<Diagnostic> {
        self.records.borrow().last().copied()
    }

    pub fn count_edges(&self) -> usize {
        self.records
            .borrow()
            .iter()
            .filter(|r| matches!(r, Diagnostic::Edge { .. }))
            .count()
    }
}

impl DiagnosticSink for MockSink {
    fn emit(&self, record: Diagnostic) {
        self.records.borrow_mut().push(record);
    }
}
