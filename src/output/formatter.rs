use std::fmt::Display;
use std::io::IsTerminal;

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::laps::is_plausible;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a lap time in milliseconds as "M:SS.mmm".
/// Missing and implausible times render as "N/A".
pub fn format_lap_time(ms: Option<i64>) -> String {
    match ms {
        Some(ms) if is_plausible(ms) => {
            let minutes = ms / 60_000;
            let seconds = (ms % 60_000) / 1_000;
            let millis = ms % 1_000;
            format!("{}:{:02}.{:03}", minutes, seconds, millis)
        }
        _ => "N/A".to_string(),
    }
}

/// Format a gap in milliseconds as "+S.mmm"; zero renders as "-"
pub fn format_gap(ms: i64) -> String {
    if ms == 0 {
        return "-".to_string();
    }
    let sign = if ms < 0 { "-" } else { "+" };
    let abs = ms.abs();
    format!("{}{}.{:03}", sign, abs / 1_000, abs % 1_000)
}

/// Format points with at most two decimals, dropping trailing zeros
/// (38.00 -> "38", 32.50 -> "32.5")
pub fn format_points(points: f64) -> String {
    let formatted = format!("{:.2}", points);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn format_optional<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct Column {
    pub title: String,
    pub align: Align,
    /// Shrinks to fit the terminal
    pub flex: bool,
}

impl Column {
    pub fn left(title: impl Into<String>) -> Self {
        Self { title: title.into(), align: Align::Left, flex: false }
    }

    pub fn right(title: impl Into<String>) -> Self {
        Self { title: title.into(), align: Align::Right, flex: false }
    }

    pub fn flex(title: impl Into<String>) -> Self {
        Self { title: title.into(), align: Align::Left, flex: true }
    }
}

/// A rendered report: headed columns of pre-formatted cells
#[derive(Debug, Clone)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
    pub empty_message: String,
    pub footer: Option<String>,
}

impl Table {
    pub fn new(columns: Vec<Column>, empty_message: impl Into<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            empty_message: empty_message.into(),
            footer: None,
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

const SEPARATOR: &str = "  ";
const MIN_FLEX_WIDTH: usize = 10;

fn column_widths(table: &Table, term_width: Option<usize>) -> Vec<usize> {
    let mut widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            table
                .rows
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(col.title.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    if let (Some(limit), Some(flex)) = (term_width, table.columns.iter().position(|c| c.flex)) {
        let total: usize = widths.iter().sum::<usize>() + SEPARATOR.len() * widths.len().saturating_sub(1);
        if total > limit {
            let fixed = total - widths[flex];
            widths[flex] = limit.saturating_sub(fixed).max(MIN_FLEX_WIDTH).min(widths[flex]);
        }
    }
    widths
}

fn pad(cell: &str, width: usize, align: Align) -> String {
    match align {
        Align::Left => format!("{:<width$}", cell, width = width),
        Align::Right => format!("{:>width$}", cell, width = width),
    }
}

/// Format a table with a header line, aligned columns and an optional footer
pub fn render_table(table: &Table, use_colors: bool) -> String {
    if table.rows.is_empty() {
        return table.empty_message.clone();
    }

    let widths = column_widths(table, get_terminal_width());

    let header = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(col, w)| pad(&col.title, *w, col.align))
        .collect::<Vec<_>>()
        .join(SEPARATOR);
    let header = header.trim_end().to_string();

    let mut lines = vec![if use_colors {
        header.bold().to_string()
    } else {
        header
    }];

    for row in &table.rows {
        let line = table
            .columns
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (col, w))| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                let cell = if col.flex { truncate_name(cell, *w) } else { cell.to_string() };
                let padded = pad(&cell, *w, col.align);
                if use_colors && i == 0 {
                    padded.dimmed().to_string()
                } else {
                    padded
                }
            })
            .collect::<Vec<_>>()
            .join(SEPARATOR);
        lines.push(line.trim_end().to_string());
    }

    if let Some(ref footer) = table.footer {
        lines.push(if use_colors {
            footer.yellow().to_string()
        } else {
            footer.clone()
        });
    }

    lines.join("\n")
}

/// Format a table as tab-separated values for scripting
/// (no headers, no colors, no truncation)
pub fn render_tsv(table: &Table) -> String {
    table
        .rows
        .iter()
        .map(|row| row.join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}
