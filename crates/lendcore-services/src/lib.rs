//! Default capability implementations for lendcore
//!
//! One module per service family, plus the wiring catalog in [`catalog`]
//! that registers every default into a
//! [`ServiceRegistry`](lendcore_registry::ServiceRegistry). A host can
//! pre-empt any default by supplying its own instance before resolution; the
//! catalog recipe for that capability is then never invoked.

pub mod accounting;
pub mod assemblers;
pub mod catalog;
pub mod events;
pub mod identity;
pub mod lifecycle;
pub mod loan_services;
pub mod reprocess;
pub mod repository;
pub mod validators;
pub mod write_platform;

pub use catalog::register_loan_account_defaults;
