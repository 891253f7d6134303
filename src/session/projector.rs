//! Session settings projection.

use std::collections::BTreeMap;

use toml::{Table, Value};

use crate::config::{ConfigError, GroupTemplate, ResolvedSettings};
use crate::protocol::{ProtocolRegistry, ResolvedProtocol};

/// Read-only settings for one connection.
///
/// Every parameter of the connection is available by its upper-case name,
/// including `PROTOCOL` and `GROUP_TEMPLATES`.
#[derive(Debug, Clone)]
pub struct SessionView {
    connection_name: String,
    params: Table,
    protocol: Option<ResolvedProtocol>,
}

impl SessionView {
    pub fn connection_name(&self) -> &str {
        &self.connection_name
    }

    /// The connection's protocol, if it declares one.
    pub fn protocol(&self) -> Option<&ResolvedProtocol> {
        self.protocol.as_ref()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_integer)
    }

    pub fn params(&self) -> &Table {
        &self.params
    }

    pub fn group_templates(&self) -> BTreeMap<String, GroupTemplate> {
        self.get("GROUP_TEMPLATES")
            .and_then(Value::as_table)
            .map(|templates| {
                templates
                    .iter()
                    .map(|(id, template)| (id.clone(), template.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Project the settings of `connection`, or of the sole connection if `None`.
///
/// The settings' active protocol cache is left untouched.
pub fn project(
    settings: &ResolvedSettings,
    registry: &ProtocolRegistry,
    connection: Option<&str>,
) -> Result<SessionView, ConfigError> {
    let name = match connection {
        Some(name) => name,
        None => settings.default_connection_name()?,
    };

    let params = settings.connection_table(name)?.clone();

    let protocol = match params.get("PROTOCOL").and_then(Value::as_str) {
        Some(reference) => Some(registry.resolve(reference)?),
        None => None,
    };

    tracing::debug!(
        connection = name,
        params = params.len(),
        protocol = protocol.as_ref().map(|p| p.reference()),
        "Session settings projected"
    );

    Ok(SessionView {
        connection_name: name.to_string(),
        params,
        protocol,
    })
}
