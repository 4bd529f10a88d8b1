//! RP2040-specific HAL for the edge toggle controller
//!
//! This crate provides RP2040 implementations of the `edgetoggle-hal`
//! traits:
//!
//! - Line table over `embassy_rp` flex pins, with claim tracking, export
//!   flags and per-line debounce settings ([`Rp2040Gpio`])
//! - Edge dispatcher that awaits GPIO edge interrupts on bound lines and
//!   invokes registered handlers outside the debounce window
//!   ([`EdgeDispatcher`])
//! - Pin hand-off from `embassy_rp::Peripherals` by GPIO number
//!   ([`take_lines!`])

#![no_std]

pub mod gpio;
pub mod irq;
pub mod pins;

pub use gpio::{Direction, LineInfo, Rp2040Gpio};
pub use irq::{DebounceWindow, EdgeDispatcher, MAX_BINDINGS};
pub use pins::{LineError, LINE_COUNT};
