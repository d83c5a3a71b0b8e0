//! Logging Setup
//!
//! Installs a `tracing` subscriber that writes to stderr, with the level
//! filter behind a reload layer so `.debug` can change verbosity while the
//! session runs. Results go to stdout, so logs never mix with piped output.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, Registry};

use crate::error::{RdslineError, Result};

/// Runtime handle on the log level
pub struct LogControl {
    handle: Option<reload::Handle<LevelFilter, Registry>>,
    debug: bool,
}

impl LogControl {
    /// Install the global subscriber at `DEBUG` or `WARN`
    ///
    /// If a global subscriber is already set (tests, embedding), the returned
    /// control only tracks the flag.
    pub fn init(debug: bool) -> Self {
        let (filter, handle) = reload::Layer::new(level_for(debug));
        let installed = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init()
            .is_ok();

        Self { handle: installed.then_some(handle), debug }
    }

    /// A control that never touches the global subscriber
    #[must_use]
    pub const fn disabled() -> Self {
        Self { handle: None, debug: false }
    }

    #[must_use]
    pub const fn is_debug(&self) -> bool {
        self.debug
    }

    /// Switch between `DEBUG` and `WARN`
    pub fn set_debug(&mut self, debug: bool) -> Result<()> {
        if let Some(handle) = &self.handle {
            handle
                .reload(level_for(debug))
                .map_err(|e| RdslineError::config_error(format!("Could not change log level: {e}")))?;
        }
        self.debug = debug;
        Ok(())
    }

    /// Flip the debug flag, returning the new value
    pub fn toggle(&mut self) -> Result<bool> {
        self.set_debug(!self.debug)?;
        Ok(self.debug)
    }
}

impl std::fmt::Debug for LogControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogControl")
            .field("installed", &self.handle.is_some())
            .field("debug", &self.debug)
            .finish()
    }
}

impl Default for LogControl {
    fn default() -> Self {
        Self::disabled()
    }
}

const fn level_for(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    }
}
