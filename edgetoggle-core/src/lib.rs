//! Board-agnostic core logic for the edge toggle controller
//!
//! This crate contains everything that does not depend on a specific chip:
//!
//! - Line resource management (claim, configure, export, release)
//! - Interrupt binding of the button line
//! - Edge handler and the shared LED/press-count state
//! - Load/unload orchestration with LIFO rollback
//! - Diagnostic records and error types
//! - Compile-time configuration

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod binding;
pub mod config;
pub mod controller;
pub mod diag;
pub mod error;
pub mod handler;
pub mod lines;
pub mod state;

#[cfg(test)]
mod mock;

pub use binding::{InterruptBinding, Unbound};
pub use config::ControllerConfig;
pub use controller::{Controller, FinalState};
pub use diag::{Diagnostic, DiagnosticSink, Severity};
pub use error::Error;
pub use handler::EdgeHandler;
pub use lines::{InputLine, LineManager, OutputLine, ProvisionError};
pub use state::{SharedState, StateSnapshot};
