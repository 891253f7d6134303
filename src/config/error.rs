//! Configuration error type.
//!
//! Every variant is something the user can fix in their settings module or
//! command line. The orchestrator reports these and exits without asking for
//! a restart.

use std::collections::BTreeSet;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::validation::ValidationError;

/// Errors raised while resolving or reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No settings module was named anywhere.
    #[error(
        "Settings are not configured. You must either define the environment variable {var} \
         or pass a settings module explicitly before accessing settings."
    )]
    NotConfigured { var: &'static str },

    /// The settings module could not be located on disk.
    #[error("Settings module '{module}' not found (looked for {})", .path.display())]
    ModuleNotFound { module: String, path: PathBuf },

    /// The settings module could not be read.
    #[error("Failed to read settings module {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings module is not valid TOML or does not fit the schema.
    #[error("Failed to parse settings module '{module}': {source}")]
    Parse {
        module: String,
        #[source]
        source: toml::de::Error,
    },

    /// One or more settings have the wrong shape or value.
    #[error("Invalid settings: {}", join(.0))]
    Validation(Vec<ValidationError>),

    /// No connections are configured at all.
    #[error("No connections have been configured using the 'CONNECTIONS' setting.")]
    NoConnections,

    /// A default connection was requested but more than one is configured.
    #[error(
        "Cannot fall back to a default connection as {count} connections have been configured \
         using the 'CONNECTIONS' setting. You MUST specify which connection to use."
    )]
    AmbiguousDefault { count: usize },

    /// The named connection does not exist.
    #[error("No connection named '{0}' has been configured.")]
    UnknownConnection(String),

    /// The connection has no `PROTOCOL` reference.
    #[error("Connection '{0}' does not define a PROTOCOL.")]
    MissingProtocol(String),

    /// The protocol reference is not registered.
    #[error("Unknown protocol reference '{reference}'. Registered protocols: {}", .available.join(", "))]
    UnknownProtocol {
        reference: String,
        available: Vec<String>,
    },

    /// Some requested group templates are not defined for the connection.
    #[error(
        "No group template defined for identifier(s): {} (connection '{connection}').",
        join_ids(.missing)
    )]
    MissingGroupTemplates {
        connection: String,
        missing: BTreeSet<String>,
    },
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_ids(ids: &BTreeSet<String>) -> String {
    ids.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}
