//! CLI output formatting.
//!
//! Every handler prints through the [`Line`] kinds below. In JSON mode each
//! line becomes one `{"type", "payload"}` object, so scripts can consume the
//! stream. In human mode lines are coloured and indented; quiet mode keeps
//! only warnings, errors and query results.

use std::fmt::Display;
use std::sync::OnceLock;

use owo_colors::{OwoColorize, Stream};
use serde_json::{json, Value};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::command::ColorChoice;

/// Global output flags, fixed once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputMode {
    pub json: bool,
    pub quiet: bool,
    /// Number of `-v` flags.
    pub verbose: u8,
}

impl OutputMode {
    #[must_use]
    pub const fn new(json: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            json,
            quiet,
            verbose,
        }
    }
}

static MODE: OnceLock<OutputMode> = OnceLock::new();

fn mode() -> OutputMode {
    MODE.get().copied().unwrap_or_default()
}

/// Apply the global CLI flags. Only the first call takes effect.
pub fn configure(mode: OutputMode, color: &ColorChoice) {
    match color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }
    let _ = MODE.set(mode);
}

#[must_use]
pub fn is_json() -> bool {
    mode().json
}

#[must_use]
pub fn verbosity() -> u8 {
    mode().verbose
}

#[derive(Debug, Clone, PartialEq)]
enum Line<'a> {
    Header(&'a str),
    Field(&'a str, String),
    Success(&'a str),
    Warning(&'a str),
    Error(&'a str),
    Section(&'a str),
    Note(&'a str),
}

impl Line<'_> {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Header(_) => "header",
            Self::Field(..) => "field",
            Self::Success(_) => "success",
            Self::Warning(_) => "warning",
            Self::Error(_) => "error",
            Self::Section(_) => "section",
            Self::Note(_) => "note",
        }
    }

    fn payload(&self) -> Value {
        match self {
            Self::Header(version) => json!({ "app": "polystore", "version": version }),
            Self::Field(label, value) => json!({ "label": label, "value": value }),
            Self::Section(title) => json!({ "title": title }),
            Self::Success(message)
            | Self::Warning(message)
            | Self::Error(message)
            | Self::Note(message) => json!({ "message": message }),
        }
    }

    /// Survives `--quiet`.
    const fn essential(&self) -> bool {
        matches!(self, Self::Warning(_) | Self::Error(_))
    }

    const fn stream(&self) -> Stream {
        match self {
            Self::Error(_) => Stream::Stderr,
            _ => Stream::Stdout,
        }
    }

    fn human(&self) -> String {
        let stream = self.stream();
        match self {
            Self::Header(version) => format!(
                "{} {}",
                "polystore".if_supports_color(stream, |t| t.bold()),
                version.if_supports_color(stream, |t| t.dimmed())
            ),
            Self::Field(label, value) => format!(
                "  {:<14} {value}",
                label.if_supports_color(stream, |t| t.dimmed())
            ),
            Self::Success(message) => {
                format!("  {} {message}", "✓".if_supports_color(stream, |t| t.green()))
            }
            Self::Warning(message) => {
                format!("  {} {message}", "⚠".if_supports_color(stream, |t| t.yellow()))
            }
            Self::Error(message) => {
                format!("  {} {message}", "×".if_supports_color(stream, |t| t.red()))
            }
            Self::Section(title) => format!("\n{}", title.if_supports_color(stream, |t| t.bold())),
            Self::Note(message) => {
                format!("  {}", message.if_supports_color(stream, |t| t.dimmed()))
            }
        }
    }
}

fn json_text(kind: &str, payload: Value) -> String {
    json!({ "type": kind, "payload": payload }).to_string()
}

/// The text `line` prints under `mode`, or `None` when quiet drops it.
fn render(line: &Line<'_>, mode: OutputMode) -> Option<String> {
    if mode.json {
        return Some(json_text(line.kind(), line.payload()));
    }
    if mode.quiet && !line.essential() {
        return None;
    }
    Some(line.human())
}

fn emit(line: &Line<'_>) {
    let Some(text) = render(line, mode()) else {
        return;
    };
    match line.stream() {
        Stream::Stderr => eprintln!("{text}"),
        _ => println!("{text}"),
    }
}

pub fn header(version: &str) {
    emit(&Line::Header(version));
}

/// A labelled value.
pub fn field(label: &str, value: impl Display) {
    emit(&Line::Field(label, value.to_string()));
}

pub fn success(message: &str) {
    emit(&Line::Success(message));
}

pub fn warning(message: &str) {
    emit(&Line::Warning(message));
}

/// Written to stderr in both modes.
pub fn error(message: &str) {
    emit(&Line::Error(message));
}

pub fn section(title: &str) {
    emit(&Line::Section(title));
}

pub fn note(message: &str) {
    emit(&Line::Note(message));
}

/// A typed JSON line with a handler-specific payload, e.g. a whole report.
pub fn json_line(kind: &str, payload: Value) {
    println!("{}", json_text(kind, payload));
}

/// Rows of a query answer as a rounded table. Printed in quiet mode too,
/// since the table is the answer.
pub fn table<T: Tabled>(rows: impl IntoIterator<Item = T>) {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    for line in table.to_string().lines() {
        println!("  {line}");
    }
}
