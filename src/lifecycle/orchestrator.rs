//! Launch orchestration.
//!
//! # States
//! ```text
//! NotStarted → Starting → Running → Stopping → Stopped
//!                 │           │
//!                 └───────────┴──→ Failed
//! ```
//!
//! # Responsibilities
//! - Pick the connection and build the engine from its session view
//! - Route OS signals to a supervisor task that awaits `Engine::stop`
//! - Wait for `Engine::start` and map the outcome to an exit status
//! - Always make one more stop attempt before returning
//!
//! # Design Decisions
//! - Stop calls are not deduplicated; engines must make `stop` idempotent
//! - Every stop is bounded by `SHUTDOWN_TIMEOUT_SECS`; overrunning it counts
//!   as a cancelled stop
//! - One log line per terminal outcome, emitted by `exit.rs`

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tracing::Instrument;

use crate::config::{ConfigError, ResolvedSettings};
use crate::engine::{Engine, EngineError, EngineParams};
use crate::lifecycle::exit::{report_cancelled, ExitStatus, Termination};
use crate::lifecycle::shutdown::{Shutdown, ShutdownSignal};
use crate::lifecycle::signals;
use crate::protocol::ProtocolRegistry;
use crate::session::project;

/// Where a launch is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    NotStarted,
    Starting,
    Running,
    Stopping,
    Stopped,
    Failed,
}

/// Per-launch options, usually straight from the command line.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Connection to use; `None` means the sole configured connection.
    pub connection: Option<String>,
    pub new_session: bool,
    /// Listen for SIGINT/SIGTERM. Embedders driving shutdown through
    /// [`Orchestrator::shutdown_handle`] can turn this off.
    pub install_signal_handlers: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            connection: None,
            new_session: false,
            install_signal_handlers: true,
        }
    }
}

/// Result of one signal-driven shutdown sequence.
#[derive(Debug)]
enum ShutdownOutcome {
    Stopped(ShutdownSignal),
    Failed(EngineError),
}

impl ShutdownOutcome {
    fn into_termination(self) -> Termination {
        match self {
            ShutdownOutcome::Stopped(signal) => Termination::Interrupted(signal),
            ShutdownOutcome::Failed(error) => Termination::Failed(error),
        }
    }
}

/// Drives one engine from construction to exit status.
pub struct Orchestrator {
    settings: Arc<ResolvedSettings>,
    registry: Arc<ProtocolRegistry>,
    shutdown: Shutdown,
    state: watch::Sender<LifecycleState>,
}

impl Orchestrator {
    pub fn new(settings: Arc<ResolvedSettings>, registry: Arc<ProtocolRegistry>) -> Self {
        let (state, _) = watch::channel(LifecycleState::NotStarted);
        Self {
            settings,
            registry,
            shutdown: Shutdown::new(),
            state,
        }
    }

    pub fn settings(&self) -> &Arc<ResolvedSettings> {
        &self.settings
    }

    /// Handle for publishing shutdown signals without going through the OS.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Watch lifecycle state transitions.
    pub fn state(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    fn set_state(&self, next: LifecycleState) {
        let previous = self.state.send_replace(next);
        tracing::debug!(from = ?previous, to = ?next, "Lifecycle state changed");
    }

    /// Project the selected connection and hand it to `factory`.
    pub fn build_engine<F>(
        &self,
        options: &LaunchOptions,
        factory: F,
    ) -> Result<Arc<dyn Engine>, EngineError>
    where
        F: FnOnce(EngineParams) -> Result<Arc<dyn Engine>, EngineError>,
    {
        let connection_name = match &options.connection {
            Some(name) => name.clone(),
            None => self.settings.default_connection_name()?.to_string(),
        };

        let session = project(&self.settings, &self.registry, Some(&connection_name))?;
        let protocol = session
            .protocol()
            .cloned()
            .ok_or_else(|| ConfigError::MissingProtocol(connection_name.clone()))?;

        factory(EngineParams {
            connection_name,
            new_session: options.new_session,
            session,
            protocol,
        })
    }

    /// Build, start and finally stop an engine.
    ///
    /// Returns once the session is over; the caller exits with the result.
    pub async fn launch<F>(&self, options: LaunchOptions, factory: F) -> ExitStatus
    where
        F: FnOnce(EngineParams) -> Result<Arc<dyn Engine>, EngineError>,
    {
        let span = tracing::info_span!(
            "launch",
            logger = %self.settings.logger(),
            connection = options.connection.as_deref().unwrap_or("<default>"),
        );
        self.run(options, factory).instrument(span).await
    }

    async fn run<F>(&self, options: LaunchOptions, factory: F) -> ExitStatus
    where
        F: FnOnce(EngineParams) -> Result<Arc<dyn Engine>, EngineError>,
    {
        self.set_state(LifecycleState::Starting);

        let engine = match self.build_engine(&options, factory) {
            Ok(engine) => engine,
            Err(error) => {
                self.set_state(LifecycleState::Failed);
                let termination = Termination::Failed(error);
                termination.report();
                return termination.exit_status();
            }
        };

        let deadline = self.settings.shutdown_timeout();
        let requested = Arc::new(AtomicBool::new(false));
        let (outcome_tx, mut outcomes) = mpsc::unbounded_channel();

        // Subscribe before any listener can publish.
        let supervisor = tokio::spawn(
            supervise(
                engine.clone(),
                self.shutdown.subscribe(),
                deadline,
                outcome_tx,
                requested.clone(),
            )
            .in_current_span(),
        );

        let (listeners, termination) = if options.install_signal_handlers {
            match signals::install(&self.shutdown) {
                Ok(listeners) => (listeners, None),
                Err(error) => (Vec::new(), Some(Termination::Failed(EngineError::other(error)))),
            }
        } else {
            (Vec::new(), None)
        };

        let termination = match termination {
            Some(termination) => termination,
            None => self.wait(engine.clone(), &requested, &mut outcomes).await,
        };

        let failed = termination.is_failure();
        self.set_state(if failed {
            LifecycleState::Failed
        } else {
            LifecycleState::Stopping
        });

        termination.report();
        let mut status = termination.exit_status();

        if let Err(reason) = cleanup_stop(engine.as_ref(), deadline).await {
            report_cancelled(&reason);
            status = ExitStatus::Unavailable;
        }

        supervisor.abort();
        for listener in listeners {
            listener.abort();
        }

        if !failed {
            self.set_state(LifecycleState::Stopped);
        }

        tracing::info!(exit_code = status.code(), "Launch finished");
        status
    }

    /// Wait for `start` to finish or for a signal-driven shutdown to settle.
    async fn wait(
        &self,
        engine: Arc<dyn Engine>,
        requested: &AtomicBool,
        outcomes: &mut mpsc::UnboundedReceiver<ShutdownOutcome>,
    ) -> Termination {
        self.set_state(LifecycleState::Running);
        let mut start = tokio::spawn(async move { engine.start().await }.in_current_span());

        tokio::select! {
            biased;

            Some(outcome) = outcomes.recv() => {
                start.abort();
                outcome.into_termination()
            }
            joined = &mut start => {
                let termination = match joined {
                    Ok(Ok(())) => Termination::Completed,
                    Ok(Err(error)) => Termination::Failed(error),
                    Err(error) => Termination::from_join_error(error),
                };

                // Stopping the engine usually ends `start` before the supervisor
                // has finished awaiting `stop`; wait for the stop result.
                if requested.load(Ordering::SeqCst) {
                    match outcomes.recv().await {
                        Some(outcome) => settle(termination, outcome),
                        None => termination,
                    }
                } else {
                    termination
                }
            }
        }
    }
}

/// Combine what `start` returned with the result of a requested shutdown.
///
/// A failed stop always wins. After a clean stop, a completed or cancelled
/// `start` is the signal's doing; any other start failure is kept.
fn settle(start: Termination, shutdown: ShutdownOutcome) -> Termination {
    match (start, shutdown) {
        (_, ShutdownOutcome::Failed(error)) => Termination::Failed(error),
        (
            Termination::Completed | Termination::Failed(EngineError::Cancelled(_)),
            ShutdownOutcome::Stopped(signal),
        ) => Termination::Interrupted(signal),
        (start, ShutdownOutcome::Stopped(_)) => start,
    }
}

/// Handle one shutdown signal: log it and await `stop` within `deadline`.
///
/// An overrun deadline is reported as a cancelled stop.
pub async fn request_shutdown(
    engine: &dyn Engine,
    signal: &ShutdownSignal,
    deadline: Duration,
) -> Result<(), EngineError> {
    tracing::info!(signal = %signal, "Received signal {}! Initiating shutdown...", signal);

    match tokio::time::timeout(deadline, engine.stop()).await {
        Ok(result) => result,
        Err(_) => Err(EngineError::Cancelled(format!(
            "stop did not finish within {}s",
            deadline.as_secs_f64()
        ))),
    }
}

async fn supervise(
    engine: Arc<dyn Engine>,
    mut signals: broadcast::Receiver<ShutdownSignal>,
    deadline: Duration,
    outcomes: mpsc::UnboundedSender<ShutdownOutcome>,
    requested: Arc<AtomicBool>,
) {
    loop {
        match signals.recv().await {
            Ok(signal) => {
                requested.store(true, Ordering::SeqCst);
                let outcome = match request_shutdown(engine.as_ref(), &signal, deadline).await {
                    Ok(()) => ShutdownOutcome::Stopped(signal),
                    Err(error) => ShutdownOutcome::Failed(error),
                };
                if outcomes.send(outcome).is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Shutdown signals dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Final stop attempt. Returns the reason when the stop was cancelled.
async fn cleanup_stop(engine: &dyn Engine, deadline: Duration) -> Result<(), String> {
    match tokio::time::timeout(deadline, engine.stop()).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(EngineError::Cancelled(reason))) => Err(reason),
        Ok(Err(error)) => {
            tracing::error!(error = %error, "Engine stop failed during cleanup");
            Ok(())
        }
        Err(_) => Err(format!(
            "cleanup stop did not finish within {}s",
            deadline.as_secs_f64()
        )),
    }
}
