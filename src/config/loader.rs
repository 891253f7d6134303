//! Settings module loading.
//!
//! A settings module is a TOML file of upper-case names. It is named either
//! by path (`conf/prod.toml`) or as a dotted module (`conf.prod`), which is
//! looked up as `conf/prod.toml` relative to the working directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use toml::{Table, Value};

use crate::config::defaults::{self, SETTINGS_MODULE_ENV};
use crate::config::error::ConfigError;
use crate::config::schema::Settings;
use crate::config::settings::ResolvedSettings;
use crate::config::validation::validate_settings;

/// Resolve settings from an explicit module or from `FIX_SETTINGS_MODULE`.
pub fn resolve(module_override: Option<&str>) -> Result<ResolvedSettings, ConfigError> {
    resolve_with(module_override, |name| std::env::var(name).ok())
}

/// Resolve settings, reading environment variables through `env`.
pub fn resolve_with<F>(module_override: Option<&str>, env: F) -> Result<ResolvedSettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let module = match module_override {
        Some(module) => module.to_string(),
        None => env(SETTINGS_MODULE_ENV)
            .filter(|module| !module.trim().is_empty())
            .ok_or(ConfigError::NotConfigured {
                var: SETTINGS_MODULE_ENV,
            })?,
    };

    let path = locate_module(&module)?;
    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::debug!(module = %module, path = %path.display(), "Loading settings module");
    resolve_from_str(&module, &content)
}

/// Merge a settings module's source text over the defaults.
pub fn resolve_from_str(module: &str, source: &str) -> Result<ResolvedSettings, ConfigError> {
    let overrides: Table = toml::from_str(source).map_err(|source| ConfigError::Parse {
        module: module.to_string(),
        source,
    })?;

    let mut merged = defaults::table();
    let mut explicitly_set = BTreeSet::new();

    for (name, value) in overrides {
        if !defaults::is_setting_name(&name) {
            tracing::warn!(setting = %name, module, "Ignoring setting that is not upper case");
            continue;
        }
        merged.insert(name.clone(), value);
        explicitly_set.insert(name);
    }

    merged.insert(SETTINGS_MODULE_ENV.to_string(), Value::String(module.to_string()));

    validate_settings(&merged).map_err(ConfigError::Validation)?;

    let values: Settings = Value::Table(merged.clone())
        .try_into()
        .map_err(|source| ConfigError::Parse {
            module: module.to_string(),
            source,
        })?;

    tracing::debug!(
        module,
        overridden = ?explicitly_set,
        connections = values.connections.len(),
        "Settings resolved"
    );

    Ok(ResolvedSettings::new(values, merged, explicitly_set, module.to_string()))
}

/// Map a settings module identifier to the file that holds it.
pub fn locate_module(module: &str) -> Result<PathBuf, ConfigError> {
    let candidates = candidate_paths(module);

    candidates
        .iter()
        .find(|path| path.is_file())
        .cloned()
        .ok_or_else(|| ConfigError::ModuleNotFound {
            module: module.to_string(),
            path: candidates.last().cloned().unwrap_or_else(|| PathBuf::from(module)),
        })
}

fn candidate_paths(module: &str) -> Vec<PathBuf> {
    let direct = PathBuf::from(module);
    if direct.extension().map(|ext| ext == "toml").unwrap_or(false) || module.contains(['/', '\\']) {
        return vec![direct];
    }

    let mut dotted: PathBuf = module.split('.').collect();
    dotted.set_extension("toml");
    vec![direct, dotted]
}
