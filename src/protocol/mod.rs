//! Protocol implementations and their registry.
//!
//! # Data Flow
//! ```text
//! Connection PROTOCOL = "FIX44"
//!     → registry.rs (look up factory by identifier)
//!     → fix.rs (built-in FIX versions) or a registered factory
//!     → ResolvedProtocol handed to the engine
//! ```
//!
//! # Design Decisions
//! - Protocols are registered by name at startup, never loaded by path
//! - Lookup is case-insensitive; dotted references fall back to their last segment
//! - Resolution is a pure lookup; nothing is cached here

pub mod fix;
pub mod registry;

use std::fmt;
use std::sync::Arc;

pub use fix::FixVersion;
pub use registry::{ProtocolFactory, ProtocolRegistry};

/// A wire protocol variant the engine can speak.
pub trait Protocol: Send + Sync + fmt::Debug {
    /// Registry identifier, e.g. `FIX44`.
    fn name(&self) -> &str;

    /// Value of BeginString (tag 8) on every message.
    fn begin_string(&self) -> &str;

    /// Default ApplVerID (tag 1137) for FIXT sessions.
    fn default_appl_ver_id(&self) -> Option<&str> {
        None
    }
}

/// A protocol together with the reference it was resolved from.
#[derive(Debug, Clone)]
pub struct ResolvedProtocol {
    reference: String,
    protocol: Arc<dyn Protocol>,
}

impl ResolvedProtocol {
    pub fn new(reference: impl Into<String>, protocol: Arc<dyn Protocol>) -> Self {
        Self {
            reference: reference.into(),
            protocol,
        }
    }

    /// The reference string as written in the settings.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn protocol(&self) -> &Arc<dyn Protocol> {
        &self.protocol
    }
}

impl fmt::Display for ResolvedProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.protocol.name(), self.protocol.begin_string())
    }
}
