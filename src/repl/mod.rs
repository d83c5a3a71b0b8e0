//! Session Loop
//!
//! Reads one line at a time from a [`Console`] and either dispatches a
//! dot-command or feeds the SQL buffer.
//!
//! # Buffer States
//! - Idle: empty buffer, prompt `"<profile>> "`
//! - Accumulating: non-empty buffer, prompt `"| "`
//!
//! A line ending in `;`, or a blank line while accumulating, flushes the
//! buffer to the active connection. Dot-commands are handled in either state
//! and never touch the buffer.
//!
//! # Termination
//! `.quit`, Ctrl+C at the prompt and end of input all end the session
//! successfully. An unterminated statement is dropped at end of input.

use std::path::PathBuf;

use tracing::debug;

use crate::config::{ProfileStore, SaveTarget};
use crate::error::{RdslineError, Result};
use crate::logging::LogControl;
use crate::output::{OutputStyle, StatementResult};
use crate::ui::{Console, ReadLine};

pub mod commands;

pub use commands::DotCommand;

/// Prompt shown while a statement is being accumulated
pub const CONTINUATION_PROMPT: &str = "| ";

/// Whether the session keeps reading after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Accumulates SQL lines until a statement is complete
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlBuffer {
    text: String,
}

impl SqlBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one line; returns the complete statement when the line flushes
    ///
    /// Lines are joined with a single space. A blank line flushes only a
    /// non-empty buffer.
    pub fn push(&mut self, line: &str) -> Option<String> {
        if line.trim().is_empty() {
            if self.text.is_empty() {
                return None;
            }
            let statement = self.text.trim_end().to_string();
            self.text.clear();
            return Some(statement);
        }

        self.text.push_str(line);
        if line.trim_end().ends_with(';') {
            return Some(std::mem::take(&mut self.text));
        }
        self.text.push(' ');
        None
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

/// One interactive or piped session
pub struct Session<C> {
    store: ProfileStore,
    console: C,
    log: LogControl,
    style: OutputStyle,
    save_target: Option<SaveTarget>,
    buffer: SqlBuffer,
}

impl<C: Console> Session<C> {
    /// Output style follows whether the console is interactive
    pub fn new(store: ProfileStore, console: C) -> Self {
        let style = OutputStyle::for_terminal(console.is_interactive());
        Self {
            store,
            console,
            log: LogControl::disabled(),
            style,
            save_target: None,
            buffer: SqlBuffer::new(),
        }
    }

    #[must_use]
    pub fn with_log_control(mut self, log: LogControl) -> Self {
        self.log = log;
        self
    }

    /// File that `.addprofile` writes to (defaults to `~/.rdsline`)
    #[must_use]
    pub fn with_config_path(self, path: impl Into<PathBuf>) -> Self {
        self.with_save_target(SaveTarget::File(path.into()))
    }

    /// Where `.addprofile` may write, or why it may not
    #[must_use]
    pub fn with_save_target(mut self, target: SaveTarget) -> Self {
        self.save_target = Some(target);
        self
    }

    /// Prompt for the current buffer state
    #[must_use]
    pub fn prompt(&self) -> String {
        if self.buffer.is_empty() {
            format!("{}> ", self.store.current())
        } else {
            CONTINUATION_PROMPT.to_string()
        }
    }

    /// Read and handle lines until the session ends
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let prompt = self.prompt();
            match self.console.read_line(&prompt)? {
                ReadLine::Line(line) => {
                    if self.handle_line(&line).await == Flow::Quit {
                        return Ok(());
                    }
                }
                ReadLine::Interrupted => {
                    debug!("Interrupted at the prompt");
                    self.console.print("");
                    return Ok(());
                }
                ReadLine::Eof => {
                    if !self.buffer.is_empty() {
                        debug!("Discarding unterminated statement: {}", self.buffer.as_str());
                    }
                    return Ok(());
                }
            }
        }
    }

    /// Handle one input line
    pub async fn handle_line(&mut self, line: &str) -> Flow {
        if line.starts_with('.') {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            return match DotCommand::parse(&tokens) {
                Some(command) => self.run_command(command),
                None => {
                    debug!("Ignoring unknown command: {}", tokens.first().unwrap_or(&""));
                    Flow::Continue
                }
            };
        }

        if let Some(sql) = self.buffer.push(line) {
            self.execute(&sql).await;
        }
        Flow::Continue
    }

    async fn execute(&mut self, sql: &str) {
        let result = match self.store.connection().execute(sql).await {
            Ok(result) => result,
            Err(RdslineError::NotConfigured) => StatementResult::Empty,
            Err(e) => {
                self.console.print_error(&e.message());
                return;
            }
        };

        let rendered = result.render(self.style);
        if !rendered.is_empty() {
            self.console.print(&rendered);
        }
    }

    #[must_use]
    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    #[must_use]
    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    #[must_use]
    pub fn buffer(&self) -> &SqlBuffer {
        &self.buffer
    }

    #[must_use]
    pub fn is_debug(&self) -> bool {
        self.log.is_debug()
    }
}
