//! Application bootstrap
//!
//! The composition root for a running process: builds a registry, registers
//! the default capability catalog, eagerly resolves the whole graph, and
//! hands out the two top-level facades. Any wiring failure aborts startup;
//! a partially resolved graph is never exposed.

use std::sync::Arc;

use lendcore_domain::ports::{
    LoanAccountService, LoanApplicationWritePlatformService, LoanWritePlatformService,
};
use lendcore_domain::{Error, Result};
use lendcore_registry::{CapabilityReport, RegistryError, ServiceRegistry};
use lendcore_services::catalog;
use tracing::info;

use crate::config::AppConfig;

/// Application context holding the resolved capability graph
pub struct AppContext {
    /// Application configuration
    pub config: Arc<AppConfig>,

    registry: ServiceRegistry,
    applications: Arc<dyn LoanApplicationWritePlatformService>,
    loans: Arc<dyn LoanWritePlatformService>,
    accounts: Arc<dyn LoanAccountService>,
}

impl AppContext {
    /// Application lifecycle facade: submit, approve, reject
    pub fn applications(&self) -> Arc<dyn LoanApplicationWritePlatformService> {
        self.applications.clone()
    }

    /// Post-approval facade: disburse, repay, charge off
    pub fn loans(&self) -> Arc<dyn LoanWritePlatformService> {
        self.loans.clone()
    }

    /// Persistence facade for read access to loan accounts
    pub fn accounts(&self) -> Arc<dyn LoanAccountService> {
        self.accounts.clone()
    }

    /// Introspection snapshot of the wired capability graph
    pub fn capability_graph(&self) -> Vec<CapabilityReport> {
        self.registry.report()
    }

    /// The underlying registry, for resolving further capabilities
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }
}

/// Build and fully resolve the application context
///
/// Hosts that want to replace a default capability use `seed` to call
/// [`ServiceRegistry::supply_external`] before the default catalog is
/// registered.
pub fn init_app_with<F>(config: AppConfig, seed: F) -> Result<AppContext>
where
    F: FnOnce(&ServiceRegistry) -> lendcore_registry::Result<()>,
{
    let registry = ServiceRegistry::new();
    seed(&registry).map_err(wiring_error)?;
    catalog::register_loan_account_defaults(&registry).map_err(wiring_error)?;
    registry.build_all().map_err(wiring_error)?;

    let applications = registry
        .resolve(catalog::LOAN_APPLICATION_WRITE_PLATFORM_SERVICE)
        .map_err(wiring_error)?;
    let loans = registry
        .resolve(catalog::LOAN_WRITE_PLATFORM_SERVICE)
        .map_err(wiring_error)?;
    let accounts = registry
        .resolve(catalog::LOAN_ACCOUNT_SERVICE)
        .map_err(wiring_error)?;

    info!(
        capabilities = registry.len(),
        "application context initialized"
    );
    Ok(AppContext {
        config: Arc::new(config),
        registry,
        applications,
        loans,
        accounts,
    })
}

/// Build the application context with the default catalog only
pub fn init_app(config: AppConfig) -> Result<AppContext> {
    init_app_with(config, |_| Ok(()))
}

fn wiring_error(err: RegistryError) -> Error {
    Error::Configuration {
        message: "failed to assemble the capability graph".to_string(),
        source: Some(Box::new(err)),
    }
}
