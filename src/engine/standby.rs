//! Reference engine that holds a session open until stopped.
//!
//! # States
//! ```text
//! Idle → Running: start()
//! Idle | Running → Stopped: stop()
//! Stopped → Stopped: stop() again is a no-op
//! ```

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};

use crate::engine::{Engine, EngineError, EngineParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandbyState {
    Idle,
    Running,
    Stopped,
}

/// Engine that logs its session parameters and idles until stopped.
#[derive(Debug)]
pub struct StandbyEngine {
    params: EngineParams,
    state: Mutex<StandbyState>,
    stopped: watch::Sender<bool>,
}

impl StandbyEngine {
    pub fn new(params: EngineParams) -> Self {
        let (stopped, _) = watch::channel(false);
        Self {
            params,
            state: Mutex::new(StandbyState::Idle),
            stopped,
        }
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub async fn state(&self) -> StandbyState {
        *self.state.lock().await
    }
}

#[async_trait]
impl Engine for StandbyEngine {
    async fn start(&self) -> Result<(), EngineError> {
        let mut stopped = self.stopped.subscribe();
        {
            let mut state = self.state.lock().await;
            match *state {
                StandbyState::Idle => *state = StandbyState::Running,
                StandbyState::Running => {
                    return Err(EngineError::other(format!(
                        "session '{}' is already running",
                        self.params.connection_name
                    )));
                }
                StandbyState::Stopped => return Ok(()),
            }
        }

        tracing::info!(
            connection = %self.params.connection_name,
            protocol = %self.params.protocol,
            begin_string = self.params.protocol.protocol().begin_string(),
            new_session = self.params.new_session,
            host = self.params.session.get_str("HOST"),
            "Session started"
        );

        while !*stopped.borrow_and_update() {
            // The sender lives as long as `self`.
            if stopped.changed().await.is_err() {
                break;
            }
        }

        tracing::info!(connection = %self.params.connection_name, "Session ended");
        Ok(())
    }

    async fn stop(&self) -> Result<(), EngineError> {
        let mut state = self.state.lock().await;
        if *state == StandbyState::Stopped {
            tracing::debug!(connection = %self.params.connection_name, "Session already stopped");
            return Ok(());
        }

        *state = StandbyState::Stopped;
        self.stopped.send_replace(true);
        tracing::info!(connection = %self.params.connection_name, "Session stopping");
        Ok(())
    }
}
