//! OS signal handling.
//!
//! # Responsibilities
//! - Register listeners for SIGINT and (on unix) SIGTERM
//! - Translate each received signal into a [`ShutdownSignal`]
//!
//! # Design Decisions
//! - Uses Tokio's signal handling; nothing runs inside the OS handler
//! - Listeners keep running, so a second signal triggers a second shutdown
//!   attempt rather than being swallowed

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::{Shutdown, ShutdownSignal};

/// Install signal listeners that publish to `shutdown`.
///
/// The returned handles should be aborted once the launch is over.
pub fn install(shutdown: &Shutdown) -> std::io::Result<Vec<JoinHandle<()>>> {
    let mut handles = Vec::new();

    let tx = shutdown.clone();
    handles.push(tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            forward(&tx, "SIGINT");
        }
    }));

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let tx = shutdown.clone();
        handles.push(tokio::spawn(async move {
            while sigterm.recv().await.is_some() {
                forward(&tx, "SIGTERM");
            }
        }));
    }

    tracing::debug!(listeners = handles.len(), "Signal handlers installed");
    Ok(handles)
}

/// Publish `name`. Returns false, with a warning, when nobody is listening.
fn forward(shutdown: &Shutdown, name: &str) -> bool {
    let delivered = shutdown.trigger(ShutdownSignal::new(name));
    if !delivered {
        tracing::warn!(signal = name, "Signal received but no shutdown supervisor is running");
    }
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_forward_without_supervisor() {
        let shutdown = Shutdown::new();
        assert!(!forward(&shutdown, "SIGINT"));
    }

    #[tokio::test]
    async fn test_forward_reaches_supervisor() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();

        assert!(forward(&shutdown, "SIGINT"));
        assert_eq!(rx.recv().await.unwrap().name, "SIGINT");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sigterm_is_published() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        let listeners = install(&shutdown).unwrap();

        let status = std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        let signal = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("SIGTERM was not delivered")
            .unwrap();
        assert_eq!(signal.name, "SIGTERM");

        for listener in listeners {
            listener.abort();
        }
    }
}
