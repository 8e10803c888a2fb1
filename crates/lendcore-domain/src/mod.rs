//! Domain layer for lendcore
//!
//! Core loan-account types, business events, commands, and the capability
//! port traits the composition root wires together. This crate has no
//! knowledge of the registry, configuration, or any infrastructure concern.

pub mod commands;
pub mod error;
pub mod events;
pub mod loan;
pub mod ports;

pub use error::{Error, Result};
