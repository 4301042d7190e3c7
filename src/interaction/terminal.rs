//! Terminal rendering of prompts, tables and panels.

use std::time::Duration;

use console::{pad_str, style, Alignment, Style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{ReleaseError, Result};
use crate::interaction::{Interaction, Panel, Table, Tone};

/// Interactive terminal session.
pub struct TerminalInteraction {
    theme: ColorfulTheme,
    spinner: Option<ProgressBar>,
}

impl Default for TerminalInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalInteraction {
    pub fn new() -> Self {
        TerminalInteraction {
            theme: ColorfulTheme::default(),
            spinner: None,
        }
    }

    fn create_spinner(label: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(spinner_style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }
        pb.set_message(label.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Info => Style::new().cyan(),
        Tone::Success => Style::new().green(),
        Tone::Warning => Style::new().yellow(),
        Tone::Error => Style::new().red(),
    }
}

fn tone_icon(tone: Tone) -> &'static str {
    match tone {
        Tone::Info => "→",
        Tone::Success => "✓",
        Tone::Warning => "⚠",
        Tone::Error => "✗",
    }
}

/// Render a table as aligned plain-text lines, header first.
pub fn render_table(table: &Table) -> Vec<String> {
    let widths = table.column_widths();
    let render_row = |cells: &[String]| -> String {
        widths
            .iter()
            .enumerate()
            .map(|(col, width)| {
                let cell = cells.get(col).map(String::as_str).unwrap_or("");
                pad_str(cell, *width, Alignment::Left, None).into_owned()
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(table.rows.len() + 2);
    lines.push(render_row(&table.headers));
    let rule_width = widths.iter().sum::<usize>() + widths.len().saturating_sub(1) * 2;
    lines.push("─".repeat(rule_width));
    lines.extend(table.rows.iter().map(|row| render_row(row)));
    lines
}

impl Interaction for TerminalInteraction {
    fn choose_one(&mut self, prompt: &str, options: &[String], default: usize) -> Result<usize> {
        self.clear_progress();
        let selection = Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(options)
            .default(default.min(options.len().saturating_sub(1)))
            .interact_opt()?;
        selection.ok_or(ReleaseError::Cancelled)
    }

    fn enter_text(&mut self, prompt: &str, default: &str) -> Result<String> {
        self.clear_progress();
        let text: String = Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default.to_string())
            .allow_empty(true)
            .interact_text()?;
        Ok(text)
    }

    fn enter_secret(&mut self, prompt: &str) -> Result<String> {
        self.clear_progress();
        let secret = Password::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()?;
        Ok(secret)
    }

    fn report_progress(&mut self, label: &str) {
        match &self.spinner {
            Some(pb) => pb.set_message(label.to_string()),
            None => self.spinner = Some(Self::create_spinner(label)),
        }
    }

    fn clear_progress(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    fn show_table(&mut self, table: &Table) {
        self.clear_progress();
        println!("\n{}", style(&table.title).bold().underlined());
        let mut lines = render_table(table).into_iter();
        if let Some(header) = lines.next() {
            println!("  {}", style(header).bold());
        }
        for line in lines {
            println!("  {}", line);
        }
    }

    fn show_panel(&mut self, panel: &Panel) {
        self.clear_progress();
        let border = tone_style(panel.tone);
        println!(
            "\n{} {}",
            border.apply_to(tone_icon(panel.tone)),
            border.apply_to(&panel.title).bold()
        );
        for line in panel.body.lines() {
            println!("{} {}", border.apply_to("│"), line);
        }
    }
}

impl Drop for TerminalInteraction {
    fn drop(&mut self) {
        self.clear_progress();
    }
}
