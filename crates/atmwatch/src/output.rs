//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses
//! `tabled`, structured formats use serde, plain emits one identifier
//! per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use atmwatch_core::{DeviceState, EngineState, Severity};

use crate::cli::OutputFormat;

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Status coloring ──────────────────────────────────────────────────

fn use_color() -> bool {
    io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err()
}

/// Severity cell with terminal coloring when appropriate.
pub fn severity_cell(severity: Severity) -> String {
    if !use_color() {
        return severity.to_string();
    }
    match severity {
        Severity::Low => severity.to_string().green().to_string(),
        Severity::Medium => severity.to_string().yellow().to_string(),
        Severity::High => severity.to_string().red().to_string(),
        Severity::Critical => severity.to_string().red().bold().to_string(),
    }
}

/// Device-state cell with terminal coloring when appropriate.
pub fn state_cell(state: DeviceState) -> String {
    if !use_color() {
        return state.to_string();
    }
    match state {
        DeviceState::Normal => state.to_string().green().to_string(),
        DeviceState::Suspicious => state.to_string().yellow().to_string(),
        DeviceState::Critical => state.to_string().red().bold().to_string(),
        DeviceState::Offline => state.to_string().dimmed().to_string(),
    }
}

/// Engine-state banner with terminal coloring when appropriate.
pub fn engine_state_cell(state: EngineState) -> String {
    if !use_color() {
        return state.to_string();
    }
    match state {
        EngineState::Safe => state.to_string().green().to_string(),
        EngineState::Observing => state.to_string().cyan().to_string(),
        EngineState::Suspicious => state.to_string().yellow().to_string(),
        EngineState::ConfirmedIntrusion => state.to_string().red().to_string(),
        EngineState::CriticalHazard => state.to_string().red().bold().to_string(),
    }
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let result = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    result.expect("serialization should not fail")
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}
