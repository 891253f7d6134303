//! Resolved, process-wide settings.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::{ArcSwap, ArcSwapOption};
use toml::Table;

use crate::config::error::ConfigError;
use crate::config::schema::{ConnectionConfig, GroupTemplate, Settings};
use crate::protocol::{ProtocolRegistry, ResolvedProtocol};

/// Defaults merged with a settings module.
///
/// Built once at startup by [`crate::config::loader::resolve`] and shared by
/// `Arc`. Everything is read-only except the logger name and the active
/// protocol cache.
pub struct ResolvedSettings {
    values: Settings,
    raw: Table,
    explicitly_set: BTreeSet<String>,
    settings_module: String,
    logger: ArcSwap<String>,
    active_protocol: ArcSwapOption<ResolvedProtocol>,
}

impl ResolvedSettings {
    pub(crate) fn new(
        values: Settings,
        raw: Table,
        explicitly_set: BTreeSet<String>,
        settings_module: String,
    ) -> Self {
        let logger = ArcSwap::from_pointee(values.logger.clone());
        Self {
            values,
            raw,
            explicitly_set,
            settings_module,
            logger,
            active_protocol: ArcSwapOption::empty(),
        }
    }

    /// Typed settings values.
    pub fn values(&self) -> &Settings {
        &self.values
    }

    /// Look up any merged setting by its upper-case name.
    pub fn get(&self, name: &str) -> Option<&toml::Value> {
        self.raw.get(name)
    }

    /// Identifier of the settings module these settings were loaded from.
    pub fn settings_module(&self) -> &str {
        &self.settings_module
    }

    /// Names overridden by the settings module.
    pub fn explicitly_set(&self) -> &BTreeSet<String> {
        &self.explicitly_set
    }

    pub fn is_explicitly_set(&self, name: &str) -> bool {
        self.explicitly_set.contains(name)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.values.shutdown_timeout_secs)
    }

    pub fn connections(&self) -> &BTreeMap<String, ConnectionConfig> {
        &self.values.connections
    }

    /// Look up a connection by name.
    pub fn connection(&self, name: &str) -> Result<&ConnectionConfig, ConfigError> {
        self.values
            .connections
            .get(name)
            .ok_or_else(|| ConfigError::UnknownConnection(name.to_string()))
    }

    /// Raw parameter table for a connection, every key included.
    pub(crate) fn connection_table(&self, name: &str) -> Result<&Table, ConfigError> {
        self.raw
            .get("CONNECTIONS")
            .and_then(|connections| connections.get(name))
            .and_then(|connection| connection.as_table())
            .ok_or_else(|| ConfigError::UnknownConnection(name.to_string()))
    }

    /// True iff exactly one connection is configured.
    pub fn has_safe_default(&self) -> bool {
        self.values.connections.len() == 1
    }

    /// Name of the sole configured connection.
    pub fn default_connection_name(&self) -> Result<&str, ConfigError> {
        let mut names = self.values.connections.keys();
        match (names.next(), names.next()) {
            (Some(name), None) => Ok(name.as_str()),
            (None, _) => Err(ConfigError::NoConnections),
            (Some(_), Some(_)) => Err(ConfigError::AmbiguousDefault {
                count: self.values.connections.len(),
            }),
        }
    }

    pub fn default_connection(&self) -> Result<&ConnectionConfig, ConfigError> {
        self.connection(self.default_connection_name()?)
    }

    /// Protocol of the default connection.
    ///
    /// The first successful call caches the result and later calls return the
    /// cached value without consulting the connection again, even if the
    /// registry changes. Use [`set_active_protocol`](Self::set_active_protocol)
    /// to replace it. Code that needs a specific connection's protocol should
    /// take it from that connection's [`SessionView`](crate::session::SessionView).
    pub fn active_protocol(
        &self,
        registry: &ProtocolRegistry,
    ) -> Result<ResolvedProtocol, ConfigError> {
        if let Some(cached) = self.active_protocol.load_full() {
            return Ok(ResolvedProtocol::clone(&cached));
        }

        let name = self.default_connection_name()?;
        let reference = self
            .connection(name)?
            .protocol
            .as_deref()
            .ok_or_else(|| ConfigError::MissingProtocol(name.to_string()))?;
        let resolved = registry.resolve(reference)?;

        tracing::debug!(
            connection = name,
            protocol = %resolved,
            "Active protocol resolved"
        );

        self.active_protocol.store(Some(Arc::new(resolved.clone())));
        Ok(resolved)
    }

    /// Replace the cached active protocol unconditionally.
    pub fn set_active_protocol(&self, protocol: ResolvedProtocol) {
        self.active_protocol.store(Some(Arc::new(protocol)));
    }

    /// Current logger name.
    pub fn logger(&self) -> Arc<String> {
        self.logger.load_full()
    }

    pub fn set_logger(&self, name: impl Into<String>) {
        self.logger.store(Arc::new(name.into()));
    }

    /// Group templates for a connection.
    ///
    /// With `identifiers == None` every template is returned. Otherwise
    /// exactly the requested identifiers are returned, and any that are
    /// missing are reported together.
    pub fn group_templates(
        &self,
        connection: Option<&str>,
        identifiers: Option<&BTreeSet<String>>,
    ) -> Result<BTreeMap<String, GroupTemplate>, ConfigError> {
        let name = match connection {
            Some(name) => name,
            None => self.default_connection_name()?,
        };
        let templates = &self.connection(name)?.group_templates;

        let Some(identifiers) = identifiers else {
            return Ok(templates.clone());
        };

        let found: BTreeMap<_, _> = templates
            .iter()
            .filter(|(id, _)| identifiers.contains(*id))
            .map(|(id, template)| (id.clone(), template.clone()))
            .collect();

        if found.len() != identifiers.len() {
            let missing = identifiers
                .iter()
                .filter(|id| !found.contains_key(*id))
                .cloned()
                .collect();
            return Err(ConfigError::MissingGroupTemplates {
                connection: name.to_string(),
                missing,
            });
        }

        Ok(found)
    }
}

impl fmt::Display for ResolvedSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<ResolvedSettings \"{}\">", self.settings_module)
    }
}

impl fmt::Debug for ResolvedSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedSettings")
            .field("settings_module", &self.settings_module)
            .field("explicitly_set", &self.explicitly_set)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}
