//! Configuration validation.
//!
//! # Responsibilities
//! - Shape checks on collection-valued settings (sequences stay sequences)
//! - Per-connection structure (`PROTOCOL` is a string, templates are a table)
//! - Value ranges (shutdown deadline > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Runs on the merged raw table, before typed deserialization, so errors
//!   name the offending setting instead of a serde path
//! - Runs before settings are handed to any other subsystem

use thiserror::Error;
use toml::{Table, Value};

use crate::config::defaults::SEQUENCE_SETTINGS;

/// A single failed check, naming the setting it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("The {setting} setting {reason}")]
pub struct ValidationError {
    pub setting: String,
    pub reason: String,
}

impl ValidationError {
    fn new(setting: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            setting: setting.into(),
            reason: reason.into(),
        }
    }
}

/// Validate a merged settings table.
pub fn validate_settings(settings: &Table) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for name in SEQUENCE_SETTINGS {
        if let Some(value) = settings.get(*name) {
            if !value.is_array() {
                errors.push(ValidationError::new(
                    *name,
                    format!("must be a list, got {}", value.type_str()),
                ));
            }
        }
    }

    match settings.get("CONNECTIONS") {
        Some(Value::Table(connections)) => {
            for (name, connection) in connections {
                validate_connection(name, connection, &mut errors);
            }
        }
        Some(other) => errors.push(ValidationError::new(
            "CONNECTIONS",
            format!("must be a table of connections, got {}", other.type_str()),
        )),
        None => {}
    }

    if let Some(value) = settings.get("SHUTDOWN_TIMEOUT_SECS") {
        match value.as_integer() {
            Some(secs) if secs > 0 => {}
            _ => errors.push(ValidationError::new(
                "SHUTDOWN_TIMEOUT_SECS",
                "must be a positive integer",
            )),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_connection(name: &str, connection: &Value, errors: &mut Vec<ValidationError>) {
    let setting = format!("CONNECTIONS.{}", name);

    let Some(params) = connection.as_table() else {
        errors.push(ValidationError::new(
            setting,
            format!("must be a table, got {}", connection.type_str()),
        ));
        return;
    };

    if let Some(protocol) = params.get("PROTOCOL") {
        if !protocol.is_str() {
            errors.push(ValidationError::new(
                format!("{}.PROTOCOL", setting),
                "must be a protocol reference string",
            ));
        }
    }

    if let Some(templates) = params.get("GROUP_TEMPLATES") {
        if !templates.is_table() {
            errors.push(ValidationError::new(
                format!("{}.GROUP_TEMPLATES", setting),
                format!(
                    "must be a table of identifier to template, got {}",
                    templates.type_str()
                ),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults;

    fn parse(source: &str) -> Table {
        let mut merged = defaults::table();
        merged.extend(source.parse::<Table>().unwrap());
        merged
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_settings(&defaults::table()).is_ok());
    }

    #[test]
    fn test_scalar_pipeline_apps_rejected() {
        let errors = validate_settings(&parse(r#"PIPELINE_APPS = "heartbeat""#)).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].setting, "PIPELINE_APPS");
        assert!(errors[0].to_string().contains("must be a list"));
    }

    #[test]
    fn test_collects_every_error() {
        let settings = parse(
            r#"
            PIPELINE_APPS = 3
            SHUTDOWN_TIMEOUT_SECS = 0

            [CONNECTIONS.a]
            PROTOCOL = 44
            GROUP_TEMPLATES = ["539"]
            "#,
        );

        let errors = validate_settings(&settings).unwrap_err();
        let names: Vec<_> = errors.iter().map(|e| e.setting.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "PIPELINE_APPS",
                "CONNECTIONS.a.PROTOCOL",
                "CONNECTIONS.a.GROUP_TEMPLATES",
                "SHUTDOWN_TIMEOUT_SECS",
            ]
        );
    }

    #[test]
    fn test_connections_must_be_table() {
        let errors = validate_settings(&parse(r#"CONNECTIONS = ["a", "b"]"#)).unwrap_err();
        assert_eq!(errors[0].setting, "CONNECTIONS");
    }
}
