//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! settings module (TOML, upper-case names)
//!     → loader.rs (locate & parse)
//!     → merged over defaults.rs (explicit names recorded)
//!     → validation.rs (shape checks, all errors at once)
//!     → schema.rs (typed values)
//!     → ResolvedSettings (settings.rs), shared via Arc
//! ```
//!
//! # Design Decisions
//! - Resolved once at startup; nothing re-reads the settings module
//! - Only the logger name and the active protocol cache are mutable
//! - Every failure is a `ConfigError` naming what the user must fix

pub mod defaults;
pub mod error;
pub mod loader;
pub mod schema;
pub mod settings;
pub mod validation;

pub use error::ConfigError;
pub use loader::{resolve, resolve_from_str, resolve_with};
pub use schema::{ConnectionConfig, GroupTemplate, LogFormat, Settings};
pub use settings::ResolvedSettings;
pub use validation::ValidationError;
