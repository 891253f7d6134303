//! Per-connection session settings.
//!
//! # Data Flow
//! ```text
//! ResolvedSettings + connection name (or the sole connection)
//!     → projector.rs (copy every parameter, resolve PROTOCOL)
//!     → SessionView (fresh, read-only)
//!     → handed to the engine factory
//! ```
//!
//! # Design Decisions
//! - A view is a copy; projecting never mutates the shared settings
//! - The connection's protocol travels with the view, not through the
//!   settings cache; `ResolvedSettings::active_protocol` is unaffected

pub mod projector;

pub use projector::{project, SessionView};
