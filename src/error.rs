//! Error Handling Infrastructure
//!
//! This module defines all error types used throughout rdsline.
//! Every error is caught at the session boundary and printed as a single
//! `Error: <message>` line; none of them terminate the REPL.
//!
//! # Error Categories
//! - `ParseError`: Malformed configuration file
//! - `MissingField` / `UnsupportedKind`: Profile fails validation
//! - `ProfileNotFound` / `DuplicateProfile`: Profile store lookups
//! - `NotConfigured`: SQL entered while no connection is active
//! - `BackendError`: The Data API call failed (message kept verbatim)
//! - `ConfigError`: Configuration file could not be read or written
//! - `InvalidInput`: Malformed user-supplied values (e.g. an ARN without a region)
//! - `TerminalError`: The line editor failed

use thiserror::Error;

/// Main error type for rdsline operations
#[derive(Error, Debug)]
pub enum RdslineError {
    /// Configuration bytes are not valid structured data
    #[error("Could not parse configuration: {0}")]
    ParseError(String),

    /// A profile lacks one or more required keys
    #[error("Missing required fields for profile '{profile}': {}", .fields.join(", "))]
    MissingField { profile: String, fields: Vec<String> },

    /// Profile `type` is not a recognized connection kind
    #[error("Unsupported database connection type: {0}")]
    UnsupportedKind(String),

    /// Requested profile is not in the store
    #[error("Profile '{0}' not found in config")]
    ProfileNotFound(String),

    /// Profile name is already taken
    #[error("Profile '{0}' already exists")]
    DuplicateProfile(String),

    /// No connection is active
    #[error("No connection set.")]
    NotConfigured,

    /// The remote call failed; the backend's message is kept as-is
    #[error("{0}")]
    BackendError(String),

    /// Configuration file I/O or location error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid input value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Line editor failure
    #[error("Terminal error: {0}")]
    TerminalError(String),
}

impl RdslineError {
    /// Convert error to a stable error code string
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ParseError(_) => "PARSE_ERROR",
            Self::MissingField { .. } => "MISSING_FIELD",
            Self::UnsupportedKind(_) => "UNSUPPORTED_KIND",
            Self::ProfileNotFound(_) => "PROFILE_NOT_FOUND",
            Self::DuplicateProfile(_) => "DUPLICATE_PROFILE",
            Self::NotConfigured => "NOT_CONFIGURED",
            Self::BackendError(_) => "BACKEND_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::TerminalError(_) => "TERMINAL_ERROR",
        }
    }

    /// Get human-readable error message
    ///
    /// Messages never include resolved secret values, only ARNs and names.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Whether the configuration file itself is unusable (unreadable or malformed),
    /// as opposed to one of its profiles failing validation.
    #[must_use]
    pub const fn is_unreadable_config(&self) -> bool {
        matches!(self, Self::ParseError(_) | Self::ConfigError(_))
    }

    /// Create a parse error
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::ParseError(message.into())
    }

    /// Create a missing field error
    pub fn missing_field(profile: impl Into<String>, fields: Vec<String>) -> Self {
        Self::MissingField { profile: profile.into(), fields }
    }

    /// Create an unsupported kind error
    pub fn unsupported_kind(kind: impl Into<String>) -> Self {
        Self::UnsupportedKind(kind.into())
    }

    /// Create a profile not found error
    pub fn profile_not_found(name: impl Into<String>) -> Self {
        Self::ProfileNotFound(name.into())
    }

    /// Create a duplicate profile error
    pub fn duplicate_profile(name: impl Into<String>) -> Self {
        Self::DuplicateProfile(name.into())
    }

    /// Create a backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::BackendError(message.into())
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a terminal error
    pub fn terminal(message: impl Into<String>) -> Self {
        Self::TerminalError(message.into())
    }
}

/// Result type alias for rdsline operations
pub type Result<T> = std::result::Result<T, RdslineError>;
