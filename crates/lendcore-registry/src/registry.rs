//! Capability registry and resolver
//!
//! The binding table maps each capability name to a default factory and, once
//! constructed or externally supplied, to a singleton instance. Resolution is
//! a memoized depth-first construction: resolving a capability first resolves
//! everything its factory asks for, then runs the factory exactly once.
//!
//! The table lives behind a mutex, but the lock is never held across a
//! factory invocation, so factories are free to call back into the registry
//! for their own dependencies. The build phase is single-threaded by
//! contract; after `build_all` every resolve is a cache hit and safe from any
//! thread.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, trace};

use crate::error::{DependencyChain, RegistryError, Result};

/// Typed identifier for a capability the registry can produce
///
/// A capability pairs a stable name (used in diagnostics and introspection)
/// with the trait-object type it resolves to. Declare them as constants next
/// to the trait they identify:
///
/// ```ignore
/// pub const LOAN_ASSEMBLER: Capability<dyn LoanAssembler> =
///     Capability::new("loan.assembler");
/// ```
pub struct Capability<T: ?Sized + 'static> {
    name: &'static str,
    _target: PhantomData<fn() -> T>,
}

impl<T: ?Sized + 'static> Capability<T> {
    /// Declare a capability with the given stable name
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _target: PhantomData,
        }
    }

    /// The stable name used in diagnostics and introspection
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: ?Sized + 'static> Clone for Capability<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized + 'static> Copy for Capability<T> {}

impl<T: ?Sized + 'static> std::fmt::Debug for Capability<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capability")
            .field("name", &self.name)
            .field("target", &std::any::type_name::<T>())
            .finish()
    }
}

/// Where a capability's instance comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSource {
    /// Built by the registered default factory
    Default,
    /// Pre-seeded by the host; the default factory is skipped
    External,
}

/// Introspection record for one capability, used by the CLI graph listing
#[derive(Debug, Clone)]
pub struct CapabilityReport {
    /// Capability name
    pub name: &'static str,
    /// Target trait-object type
    pub target: &'static str,
    /// Default or external binding
    pub source: BindingSource,
    /// Whether the singleton instance has been constructed
    pub resolved: bool,
}

type ErasedInstance = Box<dyn Any + Send + Sync>;
type ErasedFactory = Box<dyn FnOnce(&ServiceRegistry) -> Result<ErasedInstance> + Send>;

struct Binding {
    target_id: TypeId,
    target_name: &'static str,
    factory: Option<ErasedFactory>,
    default_registered: bool,
    instance: Option<ErasedInstance>,
    external: bool,
    resolving: bool,
}

#[derive(Default)]
struct Table {
    slots: HashMap<&'static str, Binding>,
    /// Registration order, for deterministic eager construction
    order: Vec<&'static str>,
    /// Capabilities currently mid-construction, outermost first
    chain: Vec<&'static str>,
}

/// Override-aware composition root
///
/// Holds one default construction recipe per capability and resolves the
/// graph into memoized singletons. See the crate docs for the contract.
#[derive(Default)]
pub struct ServiceRegistry {
    table: Mutex<Table>,
}

impl ServiceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_table(&self) -> MutexGuard<'_, Table> {
        // A poisoned table only means a factory panicked mid-build; the
        // bindings themselves are still consistent.
        self.table.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the default construction recipe for a capability
    ///
    /// The factory receives the registry so it can resolve its own direct
    /// dependencies; it runs at most once. Registering a second default for
    /// the same capability fails with
    /// [`RegistryError::DuplicateRegistration`], whatever the call order.
    /// Registering a default for a capability that already has an external
    /// supply is allowed; the default is simply never invoked.
    pub fn register<T, F>(&self, capability: Capability<T>, factory: F) -> Result<()>
    where
        T: ?Sized + Send + Sync + 'static,
        F: FnOnce(&ServiceRegistry) -> Result<Arc<T>> + Send + 'static,
    {
        let name = capability.name;
        let erased: ErasedFactory = Box::new(move |registry| {
            let instance: Arc<T> = factory(registry)?;
            Ok(Box::new(instance) as ErasedInstance)
        });

        let mut table = self.lock_table();
        match table.slots.get_mut(name) {
            Some(slot) => {
                check_target::<T>(name, slot)?;
                if slot.default_registered {
                    return Err(RegistryError::DuplicateRegistration { capability: name });
                }
                slot.factory = Some(erased);
                slot.default_registered = true;
            }
            None => {
                table.slots.insert(name, new_slot::<T>(Some(erased)));
                table.order.push(name);
            }
        }
        debug!(capability = name, "registered default factory");
        Ok(())
    }

    /// Pre-seed a capability with an externally built instance
    ///
    /// The default factory for the capability, registered before or after, is
    /// then never invoked: presence of an external supply always wins over
    /// the default. Supplying a capability whose instance was already
    /// constructed fails with [`RegistryError::AlreadyResolved`]; the graph
    /// never swaps a live instance.
    pub fn supply_external<T>(&self, capability: Capability<T>, instance: Arc<T>) -> Result<()>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let name = capability.name;
        let mut table = self.lock_table();
        match table.slots.get_mut(name) {
            Some(slot) => {
                check_target::<T>(name, slot)?;
                if slot.instance.is_some() {
                    return Err(RegistryError::AlreadyResolved { capability: name });
                }
                slot.instance = Some(Box::new(instance) as ErasedInstance);
                slot.external = true;
            }
            None => {
                let mut slot = new_slot::<T>(None);
                slot.instance = Some(Box::new(instance) as ErasedInstance);
                slot.external = true;
                table.slots.insert(name, slot);
                table.order.push(name);
            }
        }
        debug!(capability = name, "supplied external instance");
        Ok(())
    }

    /// Resolve the singleton instance for a capability
    ///
    /// Constructs the instance (and, transitively, its unresolved
    /// dependencies) on first access; repeated calls return the identical
    /// cached `Arc`. Fails with [`RegistryError::UnresolvedDependency`] when
    /// a required capability has neither a default nor an external supply,
    /// and with [`RegistryError::CyclicDependency`] when construction
    /// revisits a capability already in progress.
    pub fn resolve<T>(&self, capability: Capability<T>) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let name = capability.name;
        {
            let table = self.lock_table();
            if let Some(slot) = table.slots.get(name) {
                check_target::<T>(name, slot)?;
                if let Some(instance) = &slot.instance {
                    return downcast::<T>(name, slot.target_name, instance);
                }
            }
        }

        self.construct(name)?;

        let table = self.lock_table();
        let slot = table
            .slots
            .get(name)
            .ok_or(RegistryError::UnresolvedDependency {
                capability: name,
                chain: DependencyChain(table.chain.clone()),
            })?;
        match &slot.instance {
            Some(instance) => downcast::<T>(name, slot.target_name, instance),
            None => Err(RegistryError::UnresolvedDependency {
                capability: name,
                chain: DependencyChain(table.chain.clone()),
            }),
        }
    }

    /// Eagerly construct every bound capability, in registration order
    ///
    /// Any failure is fatal: a registry that cannot fully resolve must not
    /// serve any capability, so the caller is expected to abort startup on
    /// error rather than keep a partial graph.
    pub fn build_all(&self) -> Result<()> {
        let order = {
            let table = self.lock_table();
            table.order.clone()
        };
        debug!(capabilities = order.len(), "building capability graph");
        for name in order {
            self.construct(name)?;
        }
        Ok(())
    }

    /// Capability names in registration order
    pub fn capability_names(&self) -> Vec<&'static str> {
        self.lock_table().order.clone()
    }

    /// Whether a capability's singleton has been constructed
    pub fn is_resolved(&self, name: &str) -> bool {
        let table = self.lock_table();
        table
            .slots
            .get(name)
            .is_some_and(|slot| slot.instance.is_some())
    }

    /// Number of bound capabilities
    pub fn len(&self) -> usize {
        self.lock_table().order.len()
    }

    /// Whether no capabilities are bound
    pub fn is_empty(&self) -> bool {
        self.lock_table().order.is_empty()
    }

    /// Introspection snapshot of the binding table, in registration order
    pub fn report(&self) -> Vec<CapabilityReport> {
        let table = self.lock_table();
        table
            .order
            .iter()
            .filter_map(|name| {
                table.slots.get(name).map(|slot| CapabilityReport {
                    name,
                    target: slot.target_name,
                    source: if slot.external {
                        BindingSource::External
                    } else {
                        BindingSource::Default
                    },
                    resolved: slot.instance.is_some(),
                })
            })
            .collect()
    }

    /// Ensure the named capability has a constructed instance
    fn construct(&self, name: &'static str) -> Result<()> {
        let factory = {
            let mut table = self.lock_table();
            let chain = DependencyChain(table.chain.clone());
            let Some(slot) = table.slots.get_mut(name) else {
                return Err(RegistryError::UnresolvedDependency {
                    capability: name,
                    chain,
                });
            };
            if slot.instance.is_some() {
                return Ok(());
            }
            if slot.resolving {
                let mut cycle = table.chain.clone();
                cycle.push(name);
                return Err(RegistryError::CyclicDependency {
                    chain: DependencyChain(cycle),
                });
            }
            let Some(factory) = slot.factory.take() else {
                return Err(RegistryError::UnresolvedDependency {
                    capability: name,
                    chain,
                });
            };
            slot.resolving = true;
            table.chain.push(name);
            factory
        };

        trace!(capability = name, "constructing capability");
        // Lock released: the factory may resolve its own dependencies.
        let outcome = factory(self);

        let mut table = self.lock_table();
        if table.chain.last() == Some(&name) {
            table.chain.pop();
        }
        if let Some(slot) = table.slots.get_mut(name) {
            slot.resolving = false;
            match outcome {
                Ok(instance) => {
                    slot.instance = Some(instance);
                    debug!(capability = name, "constructed capability");
                    Ok(())
                }
                Err(err) => Err(err),
            }
        } else {
            // The slot cannot disappear mid-construction; treat it as missing.
            Err(RegistryError::UnresolvedDependency {
                capability: name,
                chain: DependencyChain(table.chain.clone()),
            })
        }
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let table = self.lock_table();
        f.debug_struct("ServiceRegistry")
            .field("capabilities", &table.order)
            .finish()
    }
}

fn new_slot<T: ?Sized + 'static>(factory: Option<ErasedFactory>) -> Binding {
    Binding {
        target_id: TypeId::of::<T>(),
        target_name: std::any::type_name::<T>(),
        default_registered: factory.is_some(),
        factory,
        instance: None,
        external: false,
        resolving: false,
    }
}

fn check_target<T: ?Sized + 'static>(name: &'static str, slot: &Binding) -> Result<()> {
    if slot.target_id == TypeId::of::<T>() {
        Ok(())
    } else {
        Err(RegistryError::TypeMismatch {
            capability: name,
            expected: std::any::type_name::<T>(),
            found: slot.target_name,
        })
    }
}

fn downcast<T: ?Sized + Send + Sync + 'static>(
    name: &'static str,
    target_name: &'static str,
    instance: &ErasedInstance,
) -> Result<Arc<T>> {
    instance
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or(RegistryError::TypeMismatch {
            capability: name,
            expected: std::any::type_name::<T>(),
            found: target_name,
        })
}
