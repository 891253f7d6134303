//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → the `launch` span (logger name, connection)
//!
//! Consumers:
//!     → logging.rs subscriber (stderr/stdout, compact, pretty or JSON)
//! ```
//!
//! # Design Decisions
//! - Structured fields over formatted strings where values matter
//! - `RUST_LOG` wins over the settings module so operators can debug
//!   without editing config

pub mod logging;
