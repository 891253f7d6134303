//! Shared utilities for launcher integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;

use fix_launcher::config::resolve_from_str;
use fix_launcher::{
    Engine, EngineError, EngineParams, LaunchOptions, Orchestrator, ProtocolRegistry,
    ResolvedSettings,
};

/// One connection, short shutdown deadline.
pub const ONE_CONNECTION: &str = r#"
SHUTDOWN_TIMEOUT_SECS = 1
LOGGER = "tests.client"

[CONNECTIONS.primary]
PROTOCOL = "FIX44"
HOST = "127.0.0.1"
PORT = 9876
SENDER_COMP_ID = "CLIENT"
TARGET_COMP_ID = "SERVER"

[CONNECTIONS.primary.GROUP_TEMPLATES]
"269" = ["269", "270", "271"]
"#;

/// Two connections, so there is no default.
pub const TWO_CONNECTIONS: &str = r#"
SHUTDOWN_TIMEOUT_SECS = 1

[CONNECTIONS.primary]
PROTOCOL = "FIX44"
HOST = "10.0.0.1"

[CONNECTIONS.backup]
PROTOCOL = "protocols.FIX50SP2"
HOST = "10.0.0.2"
"#;

pub fn settings(source: &str) -> Arc<ResolvedSettings> {
    Arc::new(resolve_from_str("tests.settings", source).expect("test settings must resolve"))
}

pub fn orchestrator(source: &str) -> Orchestrator {
    Orchestrator::new(settings(source), Arc::new(ProtocolRegistry::with_builtin()))
}

/// Launch options that leave process signals alone.
pub fn options(connection: Option<&str>) -> LaunchOptions {
    LaunchOptions {
        connection: connection.map(str::to_string),
        new_session: false,
        install_signal_handlers: false,
    }
}

/// What `MockEngine::start` does.
#[derive(Clone, Copy)]
pub enum StartBehavior {
    /// Return `Ok` straight away.
    Complete,
    /// Block until `stop` is called, then return `Ok`.
    UntilStopped,
    /// Block until `stop` is called, then report cancellation.
    CancelledOnStop,
    Fail(fn() -> EngineError),
    Panic,
}

/// What `MockEngine::stop` does after recording the call.
#[derive(Clone, Copy)]
pub enum StopBehavior {
    Ok,
    Cancel,
    /// Cancel the first call only; later calls succeed.
    CancelFirst,
    /// Never return.
    Hang,
}

pub struct MockEngine {
    start_behavior: StartBehavior,
    stop_behavior: StopBehavior,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    stopped: watch::Sender<bool>,
}

impl MockEngine {
    pub fn new(start_behavior: StartBehavior, stop_behavior: StopBehavior) -> Arc<Self> {
        let (stopped, _) = watch::channel(false);
        Arc::new(Self {
            start_behavior,
            stop_behavior,
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
            stopped,
        })
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    async fn wait_for_stop(&self) {
        let mut rx = self.stopped.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

#[async_trait]
impl Engine for MockEngine {
    async fn start(&self) -> Result<(), EngineError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        match self.start_behavior {
            StartBehavior::Complete => Ok(()),
            StartBehavior::UntilStopped => {
                self.wait_for_stop().await;
                Ok(())
            }
            StartBehavior::CancelledOnStop => {
                self.wait_for_stop().await;
                Err(EngineError::Cancelled("session closed by stop".into()))
            }
            StartBehavior::Fail(error) => Err(error()),
            StartBehavior::Panic => panic!("engine exploded"),
        }
    }

    async fn stop(&self) -> Result<(), EngineError> {
        let previous_calls = self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.stopped.send_replace(true);
        match self.stop_behavior {
            StopBehavior::Ok => Ok(()),
            StopBehavior::Cancel => Err(EngineError::Cancelled("logout was interrupted".into())),
            StopBehavior::CancelFirst if previous_calls == 0 => {
                Err(EngineError::Cancelled("logout was interrupted".into()))
            }
            StopBehavior::CancelFirst => Ok(()),
            StopBehavior::Hang => std::future::pending().await,
        }
    }
}

/// Factory handing out `engine` and recording the parameters it was built with.
pub fn factory(
    engine: &Arc<MockEngine>,
    built_with: &Arc<Mutex<Option<EngineParams>>>,
) -> impl FnOnce(EngineParams) -> Result<Arc<dyn Engine>, EngineError> {
    let engine = engine.clone();
    let built_with = built_with.clone();
    move |params| {
        *built_with.lock().unwrap() = Some(params);
        Ok(engine as Arc<dyn Engine>)
    }
}
