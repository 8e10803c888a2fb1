//! Lendcore facade crate
//!
//! Ties the workspace together for a running process: configuration loading
//! ([`config`]), logging initialization ([`logging`]), and the bootstrap
//! that builds and resolves the capability graph ([`bootstrap`]).
//!
//! Library consumers embed the platform like the binary does:
//!
//! ```ignore
//! let config = ConfigLoader::new().load()?;
//! let context = init_app(config)?;
//! let applications = context.applications();
//! ```

pub mod bootstrap;
pub mod config;
pub mod logging;

pub use bootstrap::{init_app, init_app_with, AppContext};
pub use config::{AppConfig, ConfigLoader};
pub use logging::init_logging;
