//! Session engine interface.
//!
//! The engine encodes and decodes wire messages, manages sequence numbers and
//! owns the socket. The launcher only needs to build it, start it and stop it.
//!
//! # Contract
//! - `start` runs until the session ends, fails, or `stop` is called
//! - `stop` must be idempotent and safe to call concurrently; the launcher may
//!   call it once from a signal and once more during cleanup

pub mod standby;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ConfigError;
use crate::protocol::ResolvedProtocol;
use crate::session::SessionView;

pub use standby::StandbyEngine;

/// A running protocol session.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Start the session and wait for it to finish.
    async fn start(&self) -> Result<(), EngineError>;

    /// Stop the session. Must tolerate repeated and concurrent calls.
    async fn stop(&self) -> Result<(), EngineError>;
}

/// Everything an engine is constructed from.
#[derive(Debug, Clone)]
pub struct EngineParams {
    pub connection_name: String,
    /// Reset sequence numbers and start a fresh session.
    pub new_session: bool,
    pub session: SessionView,
    pub protocol: ResolvedProtocol,
}

/// Errors surfaced by an engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine found a configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An awaited operation did not finish in time.
    #[error("timed out: {0}")]
    Timeout(String),

    /// An awaited operation was cancelled.
    #[error("{0}")]
    Cancelled(String),

    /// The user interrupted the session directly.
    #[error("interrupted by user")]
    Interrupted,

    /// Anything else.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl EngineError {
    pub fn other<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        EngineError::Other(error.into())
    }
}
