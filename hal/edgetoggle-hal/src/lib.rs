//! edgetoggle Hardware Abstraction Layer
//!
//! This crate defines the host-side collaborators the controller core talks
//! to: the GPIO subsystem and the interrupt controller. Chip-specific HALs
//! (RP2040, ...) implement these traits; the core never touches registers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Firmware (edgetoggle-firmware)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  edgetoggle-core (lines, binding, edge) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  edgetoggle-hal (this crate - traits)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ edgetoggle-   │
//!             │  hal-rp2040   │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::GpioSubsystem`] - Line claim, direction, value, debounce, export
//! - [`irq::InterruptController`] - Edge-triggered handler registration
//! - [`irq::IrqHandler`] - Handler object invoked from interrupt context

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod irq;

// Re-export key traits at crate root for convenience
pub use gpio::{GpioError, GpioSubsystem, Level, LineId};
pub use irq::{InterruptController, IrqHandler, IrqNumber, IrqReturn, Trigger};
