//! Capability Registry - Composition Root
//!
//! This crate implements the service-composition root used to assemble the
//! loan-account object graph. A [`ServiceRegistry`] holds one default
//! construction recipe per capability, lets a host (or a test harness)
//! pre-seed capabilities with externally built instances, and resolves the
//! whole graph into memoized singletons exactly once.
//!
//! ## Architecture
//!
//! ```text
//! register(cap, factory)      supply_external(cap, instance)
//!          │                              │
//!          ▼                              ▼
//! ┌─────────────────────────────────────────────┐
//! │        ServiceRegistry (binding table)      │
//! └─────────────────────────────────────────────┘
//!          │ resolve(cap) / build_all()
//!          ▼
//!   memoized depth-first construction
//!   (external supply always wins over the default factory)
//! ```
//!
//! ## Key Principles
//!
//! - **Trait-based wiring**: every capability resolves to an `Arc<dyn Trait>`
//! - **Explicit overrides**: an external supply preempts the default factory,
//!   with no merge or partial-override behavior
//! - **Fail fast**: duplicate registrations, missing dependencies, and
//!   dependency cycles abort graph construction with a chain diagnostic
//! - **Immutable after build**: once constructed, every resolve is a cache hit

pub mod error;
pub mod registry;

pub use error::{DependencyChain, RegistryError, Result};
pub use registry::{BindingSource, Capability, CapabilityReport, ServiceRegistry};
