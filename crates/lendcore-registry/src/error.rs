//! Error types for graph construction
//!
//! Every variant here is fatal at startup: the process must not serve any
//! capability if the graph cannot be fully resolved.

use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T, E = RegistryError> = std::result::Result<T, E>;

/// The chain of capabilities that were mid-construction when an error
/// occurred, outermost first. Rendered as `a -> b -> c` in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DependencyChain(pub Vec<&'static str>);

impl DependencyChain {
    /// Whether the chain names a capability
    pub fn contains(&self, capability: &str) -> bool {
        self.0.iter().any(|c| *c == capability)
    }
}

impl std::fmt::Display for DependencyChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        f.write_str(&self.0.join(" -> "))
    }
}

/// Errors raised while registering bindings or resolving the object graph
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Two default factories were registered for the same capability
    #[error("duplicate default registration for capability '{capability}'")]
    DuplicateRegistration {
        /// The capability registered twice
        capability: &'static str,
    },

    /// A factory declared a dependency with no default and no external supply
    #[error("unresolved dependency '{capability}' (required via {chain})")]
    UnresolvedDependency {
        /// The capability nobody can produce
        capability: &'static str,
        /// The construction chain that required it
        chain: DependencyChain,
    },

    /// Resolution recursion revisited a capability already in progress
    #[error("cyclic dependency detected: {chain}")]
    CyclicDependency {
        /// The chain ending in the revisited capability
        chain: DependencyChain,
    },

    /// An external supply arrived after the capability was already constructed
    #[error("capability '{capability}' is already constructed; external supply rejected")]
    AlreadyResolved {
        /// The capability that was already constructed
        capability: &'static str,
    },

    /// A capability name was reused with a different target type
    #[error("capability '{capability}' resolves to {found}, not {expected}")]
    TypeMismatch {
        /// The capability with conflicting types
        capability: &'static str,
        /// The type requested by the caller
        expected: &'static str,
        /// The type recorded at registration
        found: &'static str,
    },

    /// A default factory failed while constructing its capability
    #[error("failed to construct capability '{capability}': {source}")]
    Construction {
        /// The capability whose factory failed
        capability: &'static str,
        /// The underlying failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl RegistryError {
    /// Wrap a factory failure with the capability it was constructing
    pub fn construction(
        capability: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Construction {
            capability,
            source: source.into(),
        }
    }
}
