//! Operator interaction - prompts, progress and structured output.
//!
//! The release process talks to the operator only through the
//! [Interaction] trait:
//! - `terminal` - dialoguer prompts, an indicatif spinner and console styling
//! - `scripted` - pre-recorded answers for tests and non-interactive callers

use crate::error::Result;

pub mod scripted;
pub mod terminal;

pub use scripted::{Answer, ScriptedInteraction};
pub use terminal::TerminalInteraction;

/// Colour/severity of a [Panel].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Warning,
    Error,
}

/// A titled block of free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub title: String,
    pub body: String,
    pub tone: Tone,
}

impl Panel {
    pub fn new(title: impl Into<String>, body: impl Into<String>, tone: Tone) -> Self {
        Panel {
            title: title.into(),
            body: body.into(),
            tone,
        }
    }

    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(title, body, Tone::Info)
    }

    pub fn success(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(title, body, Tone::Success)
    }

    pub fn warning(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(title, body, Tone::Warning)
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(title, body, Tone::Error)
    }
}

/// A titled grid of text cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(title: impl Into<String>, headers: impl IntoIterator<Item = S>) -> Self {
        Table {
            title: title.into(),
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row<S: Into<String>>(mut self, cells: impl IntoIterator<Item = S>) -> Self {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    /// Width of each column: the widest header or cell, in display columns.
    pub fn column_widths(&self) -> Vec<usize> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);

        (0..columns)
            .map(|col| {
                std::iter::once(&self.headers)
                    .chain(self.rows.iter())
                    .filter_map(|row| row.get(col))
                    .map(|cell| console::measure_text_width(cell))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

/// Operator-facing prompts and output.
///
/// Prompts return [ReleaseError::Cancelled](crate::error::ReleaseError::Cancelled)
/// when the operator backs out, so callers can treat that like any other
/// cancellation.
pub trait Interaction {
    /// Pick one of `options`; returns its index.
    fn choose_one(&mut self, prompt: &str, options: &[String], default: usize) -> Result<usize>;

    /// Free-form text; an empty answer returns `default`.
    fn enter_text(&mut self, prompt: &str, default: &str) -> Result<String>;

    /// Hidden input for credentials.
    fn enter_secret(&mut self, prompt: &str) -> Result<String>;

    /// Start or relabel the progress indicator.
    fn report_progress(&mut self, label: &str);

    fn clear_progress(&mut self);

    fn show_table(&mut self, table: &Table);

    fn show_panel(&mut self, panel: &Panel);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_widths() {
        let table = Table::new("Changes", ["Status", "Path"])
            .row(["M", "src/lib.rs"])
            .row(["A", "a"]);
        assert_eq!(table.column_widths(), vec![6, 10]);
    }

    #[test]
    fn test_column_widths_ragged_rows() {
        let table = Table::new("t", ["a"]).row(["x", "longer"]);
        assert_eq!(table.column_widths(), vec![1, 6]);
    }

    #[test]
    fn test_panel_constructors() {
        assert_eq!(Panel::warning("t", "b").tone, Tone::Warning);
        assert_eq!(Panel::success("t", "b").tone, Tone::Success);
    }
}
