//! Dot-Commands
//!
//! Lines starting with `.` are split on whitespace; the first token selects
//! the command and the rest are its arguments. Unknown commands are ignored.
//!
//! # Commands
//! - `.help` - list commands
//! - `.quit` - end the session
//! - `.debug` - toggle debug logging
//! - `.profile [name]` - describe the active connection, or switch profile
//! - `.profiles` - list profiles, marking the active one
//! - `.addprofile` - create a profile interactively and save it

use tracing::debug;

use crate::config::{
    default_config_path, Credentials, SaveTarget, StoredProfile, DEFAULT_CREDENTIALS_PROFILE,
};
use crate::engine::rds_secretsmanager::region_from_arn;
use crate::engine::ProfileKind;
use crate::error::{RdslineError, Result};
use crate::ui::Console;

use super::{Flow, Session};

/// Text printed by `.help`
pub const HELP_TEXT: &str = "\
.help - show this list of commands
.quit - quits the REPL
.debug - toggle debugging information
.profile [name] - show current connection or switch to a different profile
.profiles - list available profiles
.addprofile - add a new profile interactively";

/// A recognised dot-command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DotCommand {
    Help,
    Quit,
    Debug,
    /// Arguments after `.profile`
    Profile(Vec<String>),
    Profiles,
    AddProfile,
}

impl DotCommand {
    /// Look up a command by its first token; `None` for unknown commands
    #[must_use]
    pub fn parse(tokens: &[&str]) -> Option<Self> {
        let (name, args) = tokens.split_first()?;
        let command = match *name {
            ".help" => Self::Help,
            ".quit" => Self::Quit,
            ".debug" => Self::Debug,
            ".profile" => Self::Profile(args.iter().map(ToString::to_string).collect()),
            ".profiles" => Self::Profiles,
            ".addprofile" => Self::AddProfile,
            _ => return None,
        };
        Some(command)
    }
}

/// Ask one question, returning `Ok(None)` from the caller on cancellation
macro_rules! ask {
    ($console:expr, $label:expr, $default:expr) => {
        match $console.prompt($label, $default)? {
            Some(answer) => answer.trim().to_string(),
            None => return Ok(None),
        }
    };
}

fn required(value: String, field: &str) -> Result<String> {
    if value.is_empty() {
        return Err(RdslineError::invalid_input(format!("{field} cannot be empty")));
    }
    Ok(value)
}

impl<C: Console> Session<C> {
    pub(crate) fn run_command(&mut self, command: DotCommand) -> Flow {
        debug!("Running command: {command:?}");
        match command {
            DotCommand::Help => self.console.print(HELP_TEXT),
            DotCommand::Quit => return Flow::Quit,
            DotCommand::Debug => self.toggle_debug(),
            DotCommand::Profile(args) => self.profile(&args),
            DotCommand::Profiles => self.list_profiles(),
            DotCommand::AddProfile => self.add_profile(),
        }
        Flow::Continue
    }

    fn toggle_debug(&mut self) {
        match self.log.toggle() {
            Ok(on) => {
                let state = if on { "ON" } else { "OFF" };
                self.console.print(&format!("Debugging is {state}"));
            }
            Err(e) => self.console.print_error(&e.message()),
        }
    }

    fn profile(&mut self, args: &[String]) {
        match args {
            [] => {
                let description = self.store.connection().describe();
                self.console.print(&description);
            }
            [name] => match self.store.switch(name) {
                Ok(()) => self.console.print(&format!("Switched to profile: {name}")),
                Err(e) => self.console.print_error(&e.message()),
            },
            _ => self.console.print_error("Expecting profile name"),
        }
    }

    fn list_profiles(&mut self) {
        let names = self.store.names();
        if names.is_empty() {
            self.console.print("No profiles configured");
            return;
        }

        let current = self.store.current();
        let mut lines = vec!["Available profiles:".to_string()];
        lines.extend(names.iter().map(|name| {
            let marker = if *name == current { '*' } else { ' ' };
            format!(" {marker} {name}")
        }));
        let text = lines.join("\n");
        self.console.print(&text);
    }

    fn add_profile(&mut self) {
        if let Some(SaveTarget::Unavailable(reason)) = &self.save_target {
            let message = format!("Cannot add profiles: {reason}");
            self.console.print_error(&message);
            return;
        }

        let outcome = self.collect_profile().and_then(|collected| match collected {
            Some((name, profile)) => self.save_profile(&name, profile).map(|()| Some(name)),
            None => Ok(None),
        });

        match outcome {
            Ok(Some(name)) => self.console.print(&format!("Profile '{name}' added successfully")),
            Ok(None) => self.console.print("Profile creation cancelled"),
            Err(e) => self.console.print_error(&e.message()),
        }
    }

    /// Prompt for every field, validating as we go
    ///
    /// `Ok(None)` when the user cancels or declines to save.
    fn collect_profile(&mut self) -> Result<Option<(String, StoredProfile)>> {
        let interactive = self.console.is_interactive();
        if interactive {
            self.console.print("Adding a new profile. Press Ctrl+C at any time to cancel.");
        }

        let name = ask!(self.console, "Profile name", None);
        if name.is_empty() {
            return Err(RdslineError::invalid_input("Profile name cannot be empty"));
        }
        if self.store.contains(&name) {
            return Err(RdslineError::duplicate_profile(name));
        }

        let kind = ask!(self.console, "Connection type", Some(ProfileKind::default().as_str()));
        let kind = ProfileKind::parse(&kind)?;

        if interactive {
            self.console.print("Format: arn:aws:rds:<region>:<account>:cluster:<cluster-name>");
        }
        let cluster_arn = required(ask!(self.console, "Cluster ARN", None), "Cluster ARN")?;
        region_from_arn(&cluster_arn)?;

        if interactive {
            self.console
                .print("Format: arn:aws:secretsmanager:<region>:<account>:secret:<secret-name>");
        }
        let secret_arn = required(ask!(self.console, "Secret ARN", None), "Secret ARN")?;
        let database = required(ask!(self.console, "Database", None), "Database")?;

        let mut credentials_profile =
            ask!(self.console, "AWS profile", Some(DEFAULT_CREDENTIALS_PROFILE));
        if credentials_profile.is_empty() {
            credentials_profile = DEFAULT_CREDENTIALS_PROFILE.to_string();
        }

        let summary = [
            "Profile Summary:".to_string(),
            format!("  Name: {name}"),
            format!("  Type: {kind}"),
            format!("  Cluster ARN: {cluster_arn}"),
            format!("  Secret ARN: {secret_arn}"),
            format!("  Database: {database}"),
            format!("  AWS Profile: {credentials_profile}"),
        ]
        .join("\n");
        self.console.print(&summary);

        match self.console.confirm("Save this profile?", false)? {
            Some(true) => {}
            Some(false) | None => return Ok(None),
        }

        let profile = StoredProfile {
            kind: Some(kind.as_str().to_string()),
            cluster_arn: Some(cluster_arn),
            secret_arn: Some(secret_arn),
            database: Some(database),
            credentials: Some(Credentials { profile: Some(credentials_profile) }),
        };
        Ok(Some((name, profile)))
    }

    fn save_profile(&mut self, name: &str, profile: StoredProfile) -> Result<()> {
        let path = match &self.save_target {
            Some(SaveTarget::File(path)) => path.clone(),
            Some(SaveTarget::Unavailable(reason)) => {
                return Err(RdslineError::config_error(format!("Cannot add profiles: {reason}")));
            }
            None => default_config_path()?,
        };
        self.store.add_and_persist(name, profile, &path)
    }
}
