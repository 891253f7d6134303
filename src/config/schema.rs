//! Configuration schema definitions.
//!
//! This module defines the typed view of the merged settings table. Names are
//! upper case on the wire (`PIPELINE_APPS`, `CONNECTIONS`, ...) and any
//! upper-case name without a typed field is kept verbatim in `extra`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Typed settings values, deserialized from defaults merged with overrides.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error).
    pub logging_level: String,

    /// Logger name attached to lifecycle spans.
    pub logger: String,

    /// Output format for log lines.
    #[serde(default)]
    pub log_format: LogFormat,

    /// Deadline for an awaited engine stop, in seconds.
    pub shutdown_timeout_secs: u64,

    /// Connection name -> connection parameters.
    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionConfig>,

    /// Ordered processing stages.
    #[serde(default)]
    pub pipeline_apps: Vec<String>,

    /// Any other upper-case setting, merged verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, toml::Value>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

/// Parameters for one named connection.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ConnectionConfig {
    /// Protocol reference, looked up in the protocol registry.
    pub protocol: Option<String>,

    /// Repeating-group templates keyed by identifier.
    #[serde(default)]
    pub group_templates: BTreeMap<String, GroupTemplate>,

    /// Host, credentials and anything else the engine needs.
    #[serde(flatten)]
    pub params: BTreeMap<String, toml::Value>,
}

/// Structural definition of a repeating group. Opaque to the launcher.
pub type GroupTemplate = toml::Value;
