//! Statement Result Types and Rendering
//!
//! Every executed statement yields exactly one [`StatementResult`]. Results
//! are rendered immediately and not retained.
//!
//! # Output Contract
//! - Query, interactive: grid table with a header row
//! - Query, piped: no header, one line per row, cells separated by a tab
//! - Mutation: `Number of record updated: <n>`
//! - Empty: `No connection set.`
//!
//! Piped output stays free of decoration so it can be consumed by other tools.

use comfy_table::presets::ASCII_FULL_CONDENSED;
use comfy_table::Table;

use crate::engine::{decode, ExecuteStatementResponse};
use crate::error::{RdslineError, Result};

/// Text rendered for [`StatementResult::Empty`]
pub const NO_CONNECTION_MESSAGE: &str = "No connection set.";

/// How results are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStyle {
    /// Grid with headers (stdin is a terminal)
    Table,
    /// Tab-separated rows without headers (piped input)
    Plain,
}

impl OutputStyle {
    #[must_use]
    pub const fn for_terminal(is_interactive: bool) -> Self {
        if is_interactive {
            Self::Table
        } else {
            Self::Plain
        }
    }
}

/// Outcome of executing one statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementResult {
    /// Rows returned by a query, already decoded to display strings
    Query { headers: Vec<String>, rows: Vec<Vec<String>> },

    /// DML/DDL outcome
    Mutation { rows_affected: i64 },

    /// No connection is configured
    Empty,
}

impl StatementResult {
    /// Convert a raw backend response
    ///
    /// Column metadata makes it a query (even with zero records); otherwise an
    /// update count makes it a mutation. Any other shape is rejected.
    pub fn from_response(response: ExecuteStatementResponse) -> Result<Self> {
        if let Some(columns) = response.column_metadata {
            let headers = columns.into_iter().map(|c| c.name).collect();
            let rows = response
                .records
                .unwrap_or_default()
                .iter()
                .map(|record| record.iter().map(decode).collect())
                .collect();
            return Ok(Self::Query { headers, rows });
        }

        if let Some(rows_affected) = response.number_of_records_updated {
            return Ok(Self::Mutation { rows_affected });
        }

        Err(RdslineError::backend(
            "Unexpected response: neither column metadata nor an updated record count",
        ))
    }

    /// Render this result as text (without a trailing newline)
    #[must_use]
    pub fn render(&self, style: OutputStyle) -> String {
        match self {
            Self::Query { headers, rows } => match style {
                OutputStyle::Table => render_table(headers, rows),
                OutputStyle::Plain => render_plain(rows),
            },
            Self::Mutation { rows_affected } => format!("Number of record updated: {rows_affected}"),
            Self::Empty => NO_CONNECTION_MESSAGE.to_string(),
        }
    }
}

fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL_CONDENSED);
    table.set_header(headers);
    for row in rows {
        table.add_row(row);
    }
    table.to_string()
}

fn render_plain(rows: &[Vec<String>]) -> String {
    rows.iter().map(|row| row.join("\t")).collect::<Vec<_>>().join("\n")
}
