//! Protocol registry.
//!
//! Maps stable identifiers to factories. Populated at startup, then shared
//! read-mostly by the settings and the session projector.

use std::sync::Arc;

use dashmap::DashMap;

use crate::config::ConfigError;
use crate::protocol::{FixVersion, Protocol, ResolvedProtocol};

/// Builds a protocol instance.
pub type ProtocolFactory = Arc<dyn Fn() -> Arc<dyn Protocol> + Send + Sync>;

struct Entry {
    id: String,
    factory: ProtocolFactory,
}

/// Identifier → protocol factory.
#[derive(Default)]
pub struct ProtocolRegistry {
    /// Keyed by lower-cased identifier.
    entries: DashMap<String, Entry>,
}

impl ProtocolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in FIX version.
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        for version in FixVersion::ALL {
            registry.register(version.name(), move || version.into_protocol());
        }
        registry
    }

    /// Register a factory, replacing any previous entry with the same id.
    pub fn register<F>(&self, id: &str, factory: F)
    where
        F: Fn() -> Arc<dyn Protocol> + Send + Sync + 'static,
    {
        let previous = self.entries.insert(
            id.to_ascii_lowercase(),
            Entry {
                id: id.to_string(),
                factory: Arc::new(factory),
            },
        );
        if let Some(previous) = previous {
            tracing::debug!(id, replaced = %previous.id, "Protocol registration replaced");
        }
    }

    /// Resolve a protocol reference.
    ///
    /// A dotted reference (`vendor.fix.FIX44`) that is not registered as a
    /// whole is retried with its last segment.
    pub fn resolve(&self, reference: &str) -> Result<ResolvedProtocol, ConfigError> {
        let factory = self.lookup(reference).or_else(|| {
            reference
                .rsplit_once('.')
                .and_then(|(_, name)| self.lookup(name))
        });

        match factory {
            Some(factory) => Ok(ResolvedProtocol::new(reference, factory())),
            None => Err(ConfigError::UnknownProtocol {
                reference: reference.to_string(),
                available: self.identifiers(),
            }),
        }
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.entries.contains_key(&reference.to_ascii_lowercase())
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.entries.iter().map(|e| e.value().id.clone()).collect();
        ids.sort();
        ids
    }

    fn lookup(&self, id: &str) -> Option<ProtocolFactory> {
        self.entries
            .get(&id.to_ascii_lowercase())
            .map(|entry| entry.factory.clone())
    }
}

impl std::fmt::Debug for ProtocolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolRegistry")
            .field("protocols", &self.identifiers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Venue;

    impl Protocol for Venue {
        fn name(&self) -> &str {
            "VENUE"
        }

        fn begin_string(&self) -> &str {
            "FIX.4.4"
        }
    }

    #[test]
    fn test_builtin_lookup_is_case_insensitive() {
        let registry = ProtocolRegistry::with_builtin();
        let resolved = registry.resolve("fix44").unwrap();
        assert_eq!(resolved.reference(), "fix44");
        assert_eq!(resolved.protocol().name(), "FIX44");
    }

    #[test]
    fn test_dotted_reference_uses_last_segment() {
        let registry = ProtocolRegistry::with_builtin();
        let resolved = registry.resolve("vendor.protocols.FIX42").unwrap();
        assert_eq!(resolved.protocol().begin_string(), "FIX.4.2");
        assert_eq!(resolved.reference(), "vendor.protocols.FIX42");
    }

    #[test]
    fn test_unknown_reference_lists_available() {
        let registry = ProtocolRegistry::with_builtin();
        let err = registry.resolve("FIX11").unwrap_err();
        match err {
            ConfigError::UnknownProtocol { reference, available } => {
                assert_eq!(reference, "FIX11");
                assert_eq!(available, vec!["FIX42", "FIX44", "FIX50SP2"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_custom_registration() {
        let registry = ProtocolRegistry::new();
        assert!(!registry.contains("venue"));

        registry.register("VENUE", || Arc::new(Venue));
        assert!(registry.contains("venue"));
        assert_eq!(registry.resolve("Venue").unwrap().protocol().name(), "VENUE");
    }

    #[test]
    fn test_register_replaces() {
        let registry = ProtocolRegistry::with_builtin();
        registry.register("FIX44", || Arc::new(Venue));
        assert_eq!(registry.resolve("FIX44").unwrap().protocol().name(), "VENUE");
        assert_eq!(registry.identifiers().len(), 3);
    }
}
