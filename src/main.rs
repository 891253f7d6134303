//! `fix-client`: start a FIX connection and run it until shut down.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use fix_launcher::config::{self, LogFormat};
use fix_launcher::observability::logging;
use fix_launcher::{Engine, ExitStatus, LaunchOptions, Orchestrator, ProtocolRegistry, StandbyEngine};

#[derive(Parser, Debug)]
#[command(name = "fix-client", version, about = "Start a FIX connection")]
struct Cli {
    /// Connection settings to use (default: the only configured connection)
    #[arg(long)]
    connection: Option<String>,

    /// Reset sequence numbers and start a new session
    #[arg(long = "new_session", visible_alias = "new-session")]
    new_session: bool,

    /// Settings module to load instead of $FIX_SETTINGS_MODULE
    #[arg(long)]
    settings: Option<String>,

    /// Environment file loaded before settings are resolved
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,
}

/// Accept the historical single-dash spelling of `-new_session`.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            if arg == "-new_session" {
                OsString::from("--new_session")
            } else {
                arg
            }
        })
        .collect()
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    let env_file = dotenvy::from_path(&cli.env_file);

    // The global subscriber depends on the settings; cover resolution itself.
    let resolved = tracing::subscriber::with_default(logging::bootstrap(), || {
        config::resolve(cli.settings.as_deref())
    });

    let settings = match resolved {
        Ok(settings) => Arc::new(settings),
        Err(error) => {
            logging::init(logging::BOOTSTRAP_LEVEL, LogFormat::Compact);
            tracing::error!("{}", error);
            return ExitStatus::Success.into();
        }
    };

    logging::init_from_settings(&settings);

    match env_file {
        Ok(()) => tracing::debug!(path = %cli.env_file.display(), "Environment file loaded"),
        Err(error) if error.not_found() => {}
        Err(error) => tracing::warn!(
            path = %cli.env_file.display(),
            error = %error,
            "Ignoring unreadable environment file"
        ),
    }

    tracing::info!(
        settings = %settings,
        connection = cli.connection.as_deref(),
        new_session = cli.new_session,
        "fix-client v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let registry = Arc::new(ProtocolRegistry::with_builtin());
    let orchestrator = Orchestrator::new(settings, registry);

    let options = LaunchOptions {
        connection: cli.connection,
        new_session: cli.new_session,
        install_signal_handlers: true,
    };

    orchestrator
        .launch(options, |params| {
            Ok(Arc::new(StandbyEngine::new(params)) as Arc<dyn Engine>)
        })
        .await
        .into()
}
