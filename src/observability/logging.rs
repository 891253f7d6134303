//! Structured logging.
//!
//! # Responsibilities
//! - Provide a bootstrap subscriber for events emitted while settings load
//! - Initialize the global tracing subscriber once per process
//! - Pick the level from `LOGGING_LEVEL`, unless `RUST_LOG` is set
//! - Pick compact, pretty or JSON output from `LOG_FORMAT`

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ResolvedSettings};

/// Level used before the settings module has been read.
pub const BOOTSTRAP_LEVEL: &str = "info";

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Compact subscriber for the window before settings are resolved.
///
/// Meant for `tracing::subscriber::with_default`, so the global subscriber
/// can still be installed from the resolved settings afterwards.
pub fn bootstrap() -> impl Subscriber + Send + Sync {
    bootstrap_with_writer(std::io::stderr)
}

/// [`bootstrap`] writing to `writer` instead of stderr.
pub fn bootstrap_with_writer<W>(writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(filter(BOOTSTRAP_LEVEL))
        .with(fmt::layer().compact().with_ansi(false).with_writer(writer))
}

/// Initialize logging from resolved settings.
pub fn init_from_settings(settings: &ResolvedSettings) {
    let values = settings.values();
    init(&values.logging_level, values.log_format);
}

/// Initialize logging with an explicit level and format.
///
/// Later calls are ignored; the first subscriber stays installed.
pub fn init(level: &str, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(filter(level));

    let result = match format {
        LogFormat::Compact => registry.with(fmt::layer().compact().with_thread_names(true)).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty().with_thread_names(true)).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };

    match result {
        Ok(()) => tracing::debug!(level, ?format, "Logging initialized"),
        Err(_) => tracing::debug!("Logging already initialized"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::Level;

    #[test]
    fn test_bootstrap_is_scoped() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }

        let (warn, debug) = tracing::subscriber::with_default(bootstrap(), || {
            (tracing::enabled!(Level::WARN), tracing::enabled!(Level::DEBUG))
        });
        assert!(warn);
        assert!(!debug);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_resolution_warnings_reach_bootstrap() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }

        let captured = Captured::default();
        let writer = captured.clone();
        let settings = tracing::subscriber::with_default(
            bootstrap_with_writer(move || writer.clone()),
            || crate::config::resolve_from_str("tests.settings", "lowercase = 1\n"),
        )
        .unwrap();
        assert!(!settings.is_explicitly_set("lowercase"));

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Ignoring setting that is not upper case"), "{}", output);
        assert!(output.contains("lowercase"));
    }
}
