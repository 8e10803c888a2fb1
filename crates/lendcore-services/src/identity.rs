//! External-id generation

use lendcore_domain::loan::ExternalId;
use lendcore_domain::ports::ExternalIdFactory;
use uuid::Uuid;

/// UUID-backed external-id factory
#[derive(Debug, Default)]
pub struct UuidExternalIdFactory;

impl UuidExternalIdFactory {
    /// Create the factory
    pub fn new() -> Self {
        Self
    }
}

impl ExternalIdFactory for UuidExternalIdFactory {
    fn generate(&self) -> ExternalId {
        ExternalId::new(Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        let factory = UuidExternalIdFactory::new();
        assert_ne!(factory.generate(), factory.generate());
    }
}
