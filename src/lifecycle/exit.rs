//! Exit status mapping.
//!
//! | Outcome | Log level | Exit |
//! |---|---|---|
//! | completed | info | 0 |
//! | interrupted (signal or user) | info | 0 |
//! | configuration error | error | 0 (fix the config before restarting) |
//! | timeout | error | 69 |
//! | cancelled | error | 69 |
//! | anything else, including panics | error with detail | 69 |

use std::process::ExitCode;

use tokio::task::JoinError;

use crate::engine::EngineError;
use crate::lifecycle::shutdown::ShutdownSignal;

/// Process exit status, following `sysexits.h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// EX_OK. Also used for configuration errors so supervisors don't restart.
    Success,
    /// EX_UNAVAILABLE.
    Unavailable,
}

impl ExitStatus {
    pub const fn code(self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Unavailable => 69,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// How a launch ended.
#[derive(Debug)]
pub enum Termination {
    /// `start` returned normally.
    Completed,
    /// A shutdown signal stopped the session.
    Interrupted(ShutdownSignal),
    Failed(EngineError),
    /// The start task panicked.
    Panicked(String),
}

impl Termination {
    /// Classify a start task that did not return.
    pub fn from_join_error(error: JoinError) -> Self {
        if error.is_panic() {
            let payload = error.into_panic();
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string());
            Termination::Panicked(message)
        } else {
            Termination::Failed(EngineError::Cancelled("start task was cancelled".into()))
        }
    }

    /// True when the session ended because something went wrong.
    pub fn is_failure(&self) -> bool {
        match self {
            Termination::Completed | Termination::Interrupted(_) => false,
            Termination::Failed(EngineError::Interrupted) => false,
            Termination::Failed(_) | Termination::Panicked(_) => true,
        }
    }

    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Termination::Completed | Termination::Interrupted(_) => ExitStatus::Success,
            Termination::Failed(EngineError::Config(_) | EngineError::Interrupted) => {
                ExitStatus::Success
            }
            Termination::Failed(_) | Termination::Panicked(_) => ExitStatus::Unavailable,
        }
    }

    /// Emit the single log line describing this outcome.
    pub fn report(&self) {
        match self {
            Termination::Completed => tracing::info!("Session completed"),
            Termination::Interrupted(signal) => {
                tracing::info!(signal = %signal, "Shutdown complete after signal")
            }
            Termination::Failed(EngineError::Interrupted) => {
                tracing::info!("Received keyboard interrupt! Initiating shutdown...")
            }
            Termination::Failed(EngineError::Config(e)) => tracing::error!("{}", e),
            Termination::Failed(EngineError::Timeout(e)) => tracing::error!("Timed out: {}", e),
            Termination::Failed(EngineError::Cancelled(e)) => {
                report_cancelled(e)
            }
            Termination::Failed(e @ EngineError::Other(_)) => {
                tracing::error!(error = ?e, "Unexpected error: {}", e)
            }
            Termination::Panicked(message) => {
                tracing::error!(panic = %message, "Session task panicked")
            }
        }
    }
}

pub(crate) fn report_cancelled(reason: &str) {
    tracing::error!("Cancelled: connection terminated abnormally! ({})", reason);
}
