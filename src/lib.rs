//! FIX session launcher library.
//!
//! # Architecture Overview
//!
//! ```text
//!   settings module (TOML)          CLI (--connection, -new_session)
//!           │                                   │
//!           ▼                                   ▼
//!   ┌───────────────┐   Arc    ┌──────────────────────────────┐
//!   │    config     │─────────▶│     lifecycle::Orchestrator  │
//!   │ defaults+load │          │                              │
//!   └───────────────┘          │  session::project ──▶ engine │
//!           │                  │        │             factory │
//!           ▼                  │        ▼                     │
//!   ┌───────────────┐          │   protocol registry          │
//!   │   protocol    │◀─────────│                              │
//!   │   registry    │          │  start() ◀── supervisor ◀── signals
//!   └───────────────┘          └──────────────┬───────────────┘
//!                                             ▼
//!                                      ExitStatus (0 / 69)
//! ```

pub mod config;
pub mod engine;
pub mod lifecycle;
pub mod observability;
pub mod protocol;
pub mod session;

pub use config::{ConfigError, ResolvedSettings};
pub use engine::{Engine, EngineError, EngineParams, StandbyEngine};
pub use lifecycle::{ExitStatus, LaunchOptions, Orchestrator};
pub use protocol::{Protocol, ProtocolRegistry, ResolvedProtocol};
pub use session::SessionView;
