//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Launch (orchestrator.rs):
//!     Select connection → Project session → Build engine → start()
//!
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → ShutdownSignal on the shutdown channel (shutdown.rs)
//!
//! Supervisor (orchestrator.rs):
//!     ShutdownSignal → request_shutdown → stop() within the deadline
//!
//! Exit (exit.rs):
//!     Termination → one log line → ExitStatus (0 or 69)
//! ```
//!
//! # Design Decisions
//! - The OS signal context only publishes; async work happens in the supervisor
//! - A final stop is always attempted, even after a signal-driven stop
//! - Configuration errors exit 0

pub mod exit;
pub mod orchestrator;
pub mod shutdown;
pub mod signals;

pub use exit::{ExitStatus, Termination};
pub use orchestrator::{request_shutdown, LaunchOptions, LifecycleState, Orchestrator};
pub use shutdown::{Shutdown, ShutdownSignal};
