//! Built-in default settings.
//!
//! Every name here is upper case. A settings module only needs to declare the
//! values it wants to change; everything else falls back to this table.

use toml::{Table, Value};

/// Environment variable naming the settings module to merge over the defaults.
pub const SETTINGS_MODULE_ENV: &str = "FIX_SETTINGS_MODULE";

/// Settings whose values must be ordered sequences.
pub const SEQUENCE_SETTINGS: &[&str] = &["PIPELINE_APPS"];

/// Processing stages a session runs through, outermost first.
pub const DEFAULT_PIPELINE_APPS: &[&str] = &[
    "client_session",
    "heartbeat",
    "seq_num_manager",
    "authentication",
    "message_store",
    "decoder",
    "encoder",
    "wire_transport",
];

/// Build the default settings table.
pub fn table() -> Table {
    let mut defaults = Table::new();

    defaults.insert("LOGGING_LEVEL".into(), Value::String("info".into()));
    defaults.insert("LOGGER".into(), Value::String("fix_launcher".into()));
    defaults.insert("LOG_FORMAT".into(), Value::String("compact".into()));
    defaults.insert("SHUTDOWN_TIMEOUT_SECS".into(), Value::Integer(10));
    defaults.insert("CONNECTIONS".into(), Value::Table(Table::new()));
    defaults.insert(
        "PIPELINE_APPS".into(),
        Value::Array(
            DEFAULT_PIPELINE_APPS
                .iter()
                .map(|app| Value::String((*app).to_string()))
                .collect(),
        ),
    );

    defaults
}

/// Whether `name` follows the upper-case setting convention.
///
/// Digits and underscores are allowed, but at least one letter is required.
pub fn is_setting_name(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_alphabetic())
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_upper_case() {
        for name in table().keys() {
            assert!(is_setting_name(name), "{} is not an upper-case name", name);
        }
    }

    #[test]
    fn test_sequence_settings_have_sequence_defaults() {
        let defaults = table();
        for name in SEQUENCE_SETTINGS {
            assert!(defaults.get(*name).map(Value::is_array).unwrap_or(false));
        }
    }

    #[test]
    fn test_setting_name_convention() {
        assert!(is_setting_name("PIPELINE_APPS"));
        assert!(is_setting_name("FIX44_HOST"));
        assert!(!is_setting_name("pipeline_apps"));
        assert!(!is_setting_name("Logger"));
        assert!(!is_setting_name("__"));
    }
}
