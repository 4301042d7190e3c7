use std::collections::VecDeque;

use crate::error::{ReleaseError, Result};
use crate::interaction::{Interaction, Panel, Table};

/// A pre-recorded answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Pick the option whose label starts with this text (case-insensitive).
    Choose(String),
    /// Pick by index.
    Index(usize),
    /// Accept the prompt's default.
    Default,
    Text(String),
    /// Back out of the prompt.
    Cancel,
}

/// Non-interactive [Interaction] driven by a queue of answers.
///
/// Every prompt, table, panel and progress label is recorded for later
/// inspection. Running out of answers is an interaction error, so a test
/// that prompts more often than expected fails loudly.
#[derive(Debug, Default)]
pub struct ScriptedInteraction {
    answers: VecDeque<Answer>,
    pub prompts: Vec<String>,
    pub tables: Vec<Table>,
    pub panels: Vec<Panel>,
    pub progress: Vec<String>,
}

impl ScriptedInteraction {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        ScriptedInteraction {
            answers: answers.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Shorthand for a script of option-label prefixes.
    pub fn choosing<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        Self::new(labels.into_iter().map(|label| Answer::Choose(label.into())))
    }

    pub fn then(mut self, answer: Answer) -> Self {
        self.answers.push_back(answer);
        self
    }

    /// Answers not consumed by the run.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    pub fn panel_titles(&self) -> Vec<&str> {
        self.panels.iter().map(|panel| panel.title.as_str()).collect()
    }

    fn next_answer(&mut self, prompt: &str) -> Result<Answer> {
        self.prompts.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| ReleaseError::interaction(format!("no scripted answer for '{}'", prompt)))
    }
}

impl Interaction for ScriptedInteraction {
    fn choose_one(&mut self, prompt: &str, options: &[String], default: usize) -> Result<usize> {
        match self.next_answer(prompt)? {
            Answer::Default => Ok(default),
            Answer::Cancel => Err(ReleaseError::Cancelled),
            Answer::Index(index) if index < options.len() => Ok(index),
            Answer::Choose(label) => {
                let wanted = label.to_lowercase();
                options
                    .iter()
                    .position(|option| option.to_lowercase().starts_with(&wanted))
                    .ok_or_else(|| {
                        ReleaseError::interaction(format!(
                            "no option starting with '{}' in {:?}",
                            label, options
                        ))
                    })
            }
            other => Err(ReleaseError::interaction(format!(
                "answer {:?} does not fit choice '{}'",
                other, prompt
            ))),
        }
    }

    fn enter_text(&mut self, prompt: &str, default: &str) -> Result<String> {
        match self.next_answer(prompt)? {
            Answer::Text(text) if text.is_empty() => Ok(default.to_string()),
            Answer::Text(text) => Ok(text),
            Answer::Default => Ok(default.to_string()),
            Answer::Cancel => Err(ReleaseError::Cancelled),
            other => Err(ReleaseError::interaction(format!(
                "answer {:?} does not fit text prompt '{}'",
                other, prompt
            ))),
        }
    }

    fn enter_secret(&mut self, prompt: &str) -> Result<String> {
        self.enter_text(prompt, "")
    }

    fn report_progress(&mut self, label: &str) {
        self.progress.push(label.to_string());
    }

    fn clear_progress(&mut self) {}

    fn show_table(&mut self, table: &Table) {
        self.tables.push(table.clone());
    }

    fn show_panel(&mut self, panel: &Panel) {
        self.panels.push(panel.clone());
    }
}
