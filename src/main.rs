//! rdsline CLI Entry Point
//!
//! Parses flags, loads the profile file and runs the session on the current
//! thread. Results go to stdout; errors and logs go to stderr.
//!
//! # Startup
//! - `--config <path>`: an unreadable or malformed file is fatal
//! - otherwise `~/.rdsline` is loaded when it exists; if it cannot be read or
//!   parsed a warning is logged, the session starts with no profiles and
//!   `.addprofile` refuses to overwrite it
//! - a profile that fails to activate is reported, and the session starts
//!   with no connection

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;

use rdsline::config::default_config_path;
use rdsline::{
    Console, LogControl, PipedConsole, ProfileStore, SaveTarget, Session, TerminalConsole,
};

#[cfg(feature = "rds-data")]
use rdsline::sdk_client_provider as client_provider;

/// The RDS REPL
#[derive(Parser, Debug)]
#[command(name = "rdsline")]
#[command(about = "Interactive SQL REPL for Amazon RDS through the RDS Data API")]
#[command(version)]
struct Cli {
    /// Config file to read settings from
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Initial profile to use
    #[arg(long, value_name = "NAME")]
    profile: Option<String>,

    /// Turn debugging information on
    #[arg(long)]
    debug: bool,
}

#[cfg(not(feature = "rds-data"))]
fn client_provider(
    _credentials_profile: &str,
    _region: &str,
) -> rdsline::Result<std::sync::Arc<dyn rdsline::DataApiClient>> {
    Err(rdsline::RdslineError::config_error(
        "rdsline was built without the rds-data feature",
    ))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log = LogControl::init(cli.debug);

    let mut store = ProfileStore::new(client_provider);
    if let Some(name) = &cli.profile {
        store = store.with_initial_profile(name.clone());
    }
    let target = load_profiles(&mut store, cli.config.as_deref())?;

    if std::io::stdin().is_terminal() {
        let console = TerminalConsole::new().context("Could not start the line editor")?;
        run(Session::new(store, console), log, target).await
    } else {
        run(Session::new(store, PipedConsole::stdin()), log, target).await
    }
}

async fn run<C: Console>(session: Session<C>, log: LogControl, target: SaveTarget) -> Result<()> {
    let mut session = session.with_log_control(log).with_save_target(target);
    session.run().await.context("Session ended unexpectedly")
}

/// Load profiles per the startup rules; returns where `.addprofile` may write
fn load_profiles(store: &mut ProfileStore, explicit: Option<&Path>) -> Result<SaveTarget> {
    if let Some(path) = explicit {
        match store.load_file(path) {
            Ok(()) => {}
            Err(e) if e.is_unreadable_config() => {
                return Err(e)
                    .with_context(|| format!("Could not load configuration from {}", path.display()));
            }
            Err(e) => report(&e),
        }
        return Ok(SaveTarget::File(path.to_path_buf()));
    }

    let path = match default_config_path() {
        Ok(path) => path,
        Err(e) => {
            warn!("{}", e.message());
            return Ok(SaveTarget::Unavailable(e.message()));
        }
    };

    let (target, activation) = store.load_default_file(&path);
    if let Some(e) = activation {
        report(&e);
    }
    Ok(target)
}

fn report(error: &rdsline::RdslineError) {
    eprintln!("Error: {}", error.message());
}
