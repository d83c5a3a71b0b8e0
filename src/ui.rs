//! Console Input and Output
//!
//! The session talks to the user only through [`Console`]. Two
//! implementations exist:
//! - [`TerminalConsole`]: stdin is a terminal; `rustyline` line editing with
//!   in-memory history at the SQL prompt, `dialoguer` for add-profile prompts
//! - [`PipedConsole`]: stdin is a pipe or file; lines are read verbatim and
//!   no prompt is echoed
//!
//! Results go to stdout, errors go to stderr as `Error: <message>`.

use std::io::{self, BufRead, Write};

use dialoguer::{Confirm, Input};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::{RdslineError, Result};

/// Outcome of reading one line at the top-level prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadLine {
    Line(String),
    /// Ctrl+C
    Interrupted,
    /// End of input (Ctrl+D or end of the pipe)
    Eof,
}

/// Line-oriented user interaction
pub trait Console {
    /// Whether input comes from a terminal (selects table rendering)
    fn is_interactive(&self) -> bool;

    /// Read the next line at the top-level prompt
    fn read_line(&mut self, prompt: &str) -> Result<ReadLine>;

    /// Ask for one value; `Ok(None)` means the user cancelled
    ///
    /// An empty answer yields `default` when one is given.
    fn prompt(&mut self, label: &str, default: Option<&str>) -> Result<Option<String>>;

    /// Ask a yes/no question; `Ok(None)` means the user cancelled
    fn confirm(&mut self, label: &str, default: bool) -> Result<Option<bool>>;

    /// Write a line to stdout
    fn print(&mut self, text: &str);

    /// Write `Error: <message>` to stderr
    fn print_error(&mut self, message: &str);
}

fn print_stdout(text: &str) {
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{text}");
    let _ = stdout.flush();
}

fn print_stderr(message: &str) {
    let _ = writeln!(io::stderr().lock(), "Error: {message}");
}

/// Interactive terminal console
pub struct TerminalConsole {
    editor: DefaultEditor,
}

impl TerminalConsole {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new()
            .map_err(|e| RdslineError::terminal(format!("Could not initialize line editor: {e}")))?;
        Ok(Self { editor })
    }
}

/// `None` when the prompt was interrupted
fn cancelled_on_interrupt<T>(result: std::result::Result<T, dialoguer::Error>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(RdslineError::terminal(e.to_string())),
    }
}

impl Console for TerminalConsole {
    fn is_interactive(&self) -> bool {
        true
    }

    fn read_line(&mut self, prompt: &str) -> Result<ReadLine> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(ReadLine::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadLine::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadLine::Eof),
            Err(e) => Err(RdslineError::terminal(e.to_string())),
        }
    }

    fn prompt(&mut self, label: &str, default: Option<&str>) -> Result<Option<String>> {
        let mut input = Input::<String>::new().with_prompt(label).allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        cancelled_on_interrupt(input.interact_text())
    }

    fn confirm(&mut self, label: &str, default: bool) -> Result<Option<bool>> {
        // Escape also cancels
        cancelled_on_interrupt(Confirm::new().with_prompt(label).default(default).interact_opt())
            .map(Option::flatten)
    }

    fn print(&mut self, text: &str) {
        print_stdout(text);
    }

    fn print_error(&mut self, message: &str) {
        print_stderr(message);
    }
}

/// Console over piped input
///
/// Prompts are not echoed; prompt answers are consumed from the same stream
/// as SQL lines, and end of input cancels a pending prompt.
pub struct PipedConsole<R> {
    input: R,
}

impl<R: BufRead> PipedConsole<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Next line without its line ending; invalid UTF-8 is replaced, not rejected
    fn next_line(&mut self) -> Result<Option<String>> {
        let mut bytes = Vec::new();
        let read = self
            .input
            .read_until(b'\n', &mut bytes)
            .map_err(|e| RdslineError::terminal(format!("Could not read input: {e}")))?;
        if read == 0 {
            return Ok(None);
        }

        while matches!(bytes.last(), Some(b'\n' | b'\r')) {
            bytes.pop();
        }
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }
}

impl PipedConsole<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> Console for PipedConsole<R> {
    fn is_interactive(&self) -> bool {
        false
    }

    fn read_line(&mut self, _prompt: &str) -> Result<ReadLine> {
        Ok(self.next_line()?.map_or(ReadLine::Eof, ReadLine::Line))
    }

    fn prompt(&mut self, _label: &str, default: Option<&str>) -> Result<Option<String>> {
        Ok(self.next_line()?.map(|answer| match default {
            Some(default) if answer.trim().is_empty() => default.to_string(),
            _ => answer,
        }))
    }

    fn confirm(&mut self, _label: &str, default: bool) -> Result<Option<bool>> {
        Ok(self.next_line()?.map(|answer| parse_yes_no(&answer, default)))
    }

    fn print(&mut self, text: &str) {
        print_stdout(text);
    }

    fn print_error(&mut self, message: &str) {
        print_stderr(message);
    }
}

/// `y`/`yes` (any case) is yes, empty is `default`, anything else is no
#[must_use]
pub fn parse_yes_no(answer: &str, default: bool) -> bool {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_piped_read_line_strips_line_endings() {
        let mut console = PipedConsole::new(Cursor::new("SELECT 1;\r\nSELECT 2;\n  \nlast"));

        assert_eq!(console.read_line("> ").unwrap(), ReadLine::Line("SELECT 1;".to_string()));
        assert_eq!(console.read_line("> ").unwrap(), ReadLine::Line("SELECT 2;".to_string()));
        assert_eq!(console.read_line("> ").unwrap(), ReadLine::Line("  ".to_string()));
        assert_eq!(console.read_line("> ").unwrap(), ReadLine::Line("last".to_string()));
        assert_eq!(console.read_line("> ").unwrap(), ReadLine::Eof);
        assert!(!console.is_interactive());
    }

    #[test]
    fn test_piped_read_line_tolerates_invalid_utf8() {
        let mut console = PipedConsole::new(Cursor::new(&b"SELECT '\xff';\nSELECT 1;\n"[..]));

        assert_eq!(
            console.read_line("> ").unwrap(),
            ReadLine::Line("SELECT '\u{fffd}';".to_string())
        );
        assert_eq!(console.read_line("> ").unwrap(), ReadLine::Line("SELECT 1;".to_string()));
        assert_eq!(console.read_line("> ").unwrap(), ReadLine::Eof);
    }

    #[test]
    fn test_piped_prompt_uses_default_for_blank_answer() {
        let mut console = PipedConsole::new(Cursor::new("\nanalytics\n"));

        assert_eq!(
            console.prompt("AWS profile", Some("default")).unwrap(),
            Some("default".to_string())
        );
        assert_eq!(
            console.prompt("AWS profile", Some("default")).unwrap(),
            Some("analytics".to_string())
        );
        assert_eq!(console.prompt("AWS profile", None).unwrap(), None);
    }

    #[test]
    fn test_piped_confirm() {
        let mut console = PipedConsole::new(Cursor::new("y\nNo\n\n"));

        assert_eq!(console.confirm("Save?", false).unwrap(), Some(true));
        assert_eq!(console.confirm("Save?", false).unwrap(), Some(false));
        assert_eq!(console.confirm("Save?", false).unwrap(), Some(false));
        assert_eq!(console.confirm("Save?", false).unwrap(), None);
    }

    #[test]
    fn test_parse_yes_no() {
        assert!(parse_yes_no("Y", false));
        assert!(parse_yes_no(" yes ", false));
        assert!(!parse_yes_no("n", true));
        assert!(!parse_yes_no("sure", false));
        assert!(parse_yes_no("", true));
    }
}
