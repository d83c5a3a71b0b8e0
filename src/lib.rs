//! rdsline - Interactive SQL REPL for Amazon RDS
//!
//! rdsline reads SQL from a terminal or a pipe and runs it against an RDS
//! cluster through the RDS Data API, using named connection profiles kept in
//! a YAML file (`~/.rdsline` by default).
//!
//! # Architecture
//! The binary is a thin wrapper: it parses flags, loads the profile file into
//! a [`ProfileStore`], picks a [`Console`] and runs a [`Session`]. Everything
//! else lives in this library so it can be driven from tests with scripted
//! input and fake backends.
//!
//! # Module Organization
//! - [`error`] - Error types and handling
//! - [`output`] - Statement results and rendering
//! - [`engine`] - Typed cells, the backend client seam and connections
//! - [`config`] - Profile file format and the profile store
//! - [`logging`] - Subscriber setup and the runtime debug toggle
//! - [`ui`] - Terminal and piped consoles
//! - [`repl`] - Session loop, SQL buffer and dot-commands

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod output;
pub mod repl;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::{ProfileStore, SaveTarget, StoredProfile};
pub use engine::{
    decode, ClientProvider, Connection, ConnectionConfig, DataApiClient, ExecuteStatementRequest,
    ExecuteStatementResponse, ProfileKind, TypedCell,
};
pub use error::{RdslineError, Result};
pub use logging::LogControl;
pub use output::{OutputStyle, StatementResult};
pub use repl::{Flow, Session, SqlBuffer};
pub use ui::{Console, PipedConsole, ReadLine, TerminalConsole};

#[cfg(feature = "rds-data")]
pub use engine::rds_secretsmanager::client::sdk_client_provider;
