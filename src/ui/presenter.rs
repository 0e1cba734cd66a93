//! Stateful, verbosity-filtered terminal output.
//!
//! The [`Presenter`] prints messages, notify/badge pairs and sections. A
//! message at level `L` prints when the active level is at least `L`; an
//! active level of [`QUIET_LEVEL`] suppresses everything.
//!
//! A notify prints a dot-padded label and leaves the line open. The next
//! badge closes it with `[TEXT]`. If a line is printed while a notify is
//! still open, the notify is closed first with a badge chosen from the
//! line's context.
//!
//! # Example
//!
//! ```
//! use available::state::PresenterState;
//! use available::ui::{OutputContext, OutputTheme, Presenter};
//!
//! let mut presenter = Presenter::new(Vec::new(), OutputTheme::plain(), 1, PresenterState::default());
//! presenter.notify("Installing", 1);
//! presenter.badge("", OutputContext::Success);
//!
//! let output = String::from_utf8(presenter.into_inner()).unwrap();
//! assert!(output.starts_with("Installing...."));
//! assert!(output.ends_with(" [SUCCESS]\n"));
//! ```

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Local};

use super::theme::OutputTheme;
use crate::error::Result;
use crate::state::PresenterState;

/// Width notify labels are padded to at section depth 0.
pub const LINE_WIDTH: usize = 76;

/// Active level that suppresses all output.
pub const QUIET_LEVEL: i32 = -1;

/// Active level when nothing says otherwise.
pub const DEFAULT_LEVEL: i32 = 1;

/// Timestamp format for log files.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Color context of a message or badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputContext {
    Success,
    Error,
    Msg,
    Info,
    #[default]
    Default,
}

impl OutputContext {
    pub const ALL: [OutputContext; 5] = [
        Self::Success,
        Self::Error,
        Self::Msg,
        Self::Info,
        Self::Default,
    ];

    /// Flag name of this context.
    pub fn raw(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Msg => "msg",
            Self::Info => "info",
            Self::Default => "default",
        }
    }

    /// Badge text used when a badge is requested without text.
    pub fn default_badge(self) -> String {
        match self {
            Self::Default => "OK".to_string(),
            other => other.raw().to_uppercase(),
        }
    }

    /// Badge that closes an open notify before a line in this context.
    pub fn closing_badge(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
            _ => "SEE BELOW",
        }
    }
}

impl fmt::Display for OutputContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw())
    }
}

impl FromStr for OutputContext {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.raw() == s)
            .ok_or_else(|| format!("unknown output context '{}'", s))
    }
}

/// What the `output` tool does with its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputKind {
    Notify,
    Badge,
    #[default]
    Line,
    Inline,
    Section,
    EndSection,
}

/// Active level implied by `OUTPUT_VERBOSE` and `OUTPUT_QUIET` values.
///
/// `OUTPUT_VERBOSE=n` with `n > 0` raises the level to `n + 1`; `0` means
/// quiet; anything else is ignored. A non-empty `OUTPUT_QUIET` other than
/// `"0"` means quiet.
pub fn level_from_env(verbose: Option<&str>, quiet: Option<&str>) -> i32 {
    let mut level = DEFAULT_LEVEL;

    if let Some(verbose) = verbose {
        match verbose.trim().parse::<i32>() {
            Ok(n) if n > 0 => level = n.saturating_add(1),
            Ok(0) => level = QUIET_LEVEL,
            _ => {}
        }
    }

    if let Some(quiet) = quiet {
        if !quiet.is_empty() && quiet != "0" {
            level = QUIET_LEVEL;
        }
    }

    level
}

/// Active level from the process environment.
pub fn env_level() -> i32 {
    level_from_env(
        std::env::var("OUTPUT_VERBOSE").ok().as_deref(),
        std::env::var("OUTPUT_QUIET").ok().as_deref(),
    )
}

/// Renders messages to a writer.
pub struct Presenter<W: Write> {
    out: W,
    theme: OutputTheme,
    level: i32,
    state: PresenterState,
}

impl<W: Write> Presenter<W> {
    /// Create a presenter at active level `level`, resuming `state`.
    pub fn new(out: W, theme: OutputTheme, level: i32, state: PresenterState) -> Self {
        Self {
            out,
            theme,
            level,
            state,
        }
    }

    /// Active level.
    pub fn level(&self) -> i32 {
        self.level
    }

    /// Change the active level.
    pub fn set_level(&mut self, level: i32) {
        self.level = level;
    }

    /// Suppress all output.
    pub fn quiet(&mut self) {
        self.level = QUIET_LEVEL;
    }

    /// State to persist for the next invocation.
    pub fn state(&self) -> PresenterState {
        self.state
    }

    /// Whether a visible notify is waiting for its badge.
    pub fn is_notifying(&self) -> bool {
        self.state.notifying > 0 && self.level >= self.state.notifying
    }

    /// Print a dot-padded label and leave the line open for a badge.
    pub fn notify(&mut self, message: &str, level: i32) {
        if self.level < level {
            return;
        }
        self.state.notifying = level;

        let width = LINE_WIDTH.saturating_sub(self.state.section * 2);
        let dots = width.saturating_sub(message.chars().count());
        let label = self.theme.notify.apply_to(message).to_string();
        let text = format!("{}{} ", label, ".".repeat(dots));
        self.print_indented(&text);
    }

    /// Close an open notify with `[text]`.
    ///
    /// Does nothing unless a notify is open and visible. Empty text is
    /// replaced by the context's default badge.
    pub fn badge(&mut self, text: &str, context: OutputContext) {
        if !self.is_notifying() {
            return;
        }
        let text = if text.is_empty() {
            context.default_badge()
        } else {
            text.to_string()
        };
        writeln!(self.out, "[{}]", self.theme.paint(context, &text)).ok();
        self.state.notifying = 0;
    }

    /// Print a full line.
    pub fn line(&mut self, message: &str, context: OutputContext, level: i32) {
        self.output(message, context, level, "\n");
    }

    /// Print a message followed by a space, leaving the line open.
    pub fn inline(&mut self, message: &str, context: OutputContext, level: i32) {
        self.output(message, context, level, " ");
    }

    /// Print an empty line at `level`.
    pub fn blank_line(&mut self, level: i32) {
        if self.level >= level {
            writeln!(self.out).ok();
        }
    }

    /// Print a section title and indent what follows.
    pub fn section(&mut self, message: &str) {
        self.line(message, OutputContext::Msg, DEFAULT_LEVEL);
        self.state.section += 1;
    }

    /// Leave the current section.
    pub fn end_section(&mut self) {
        self.state.section = self.state.section.saturating_sub(1);
    }

    /// Apply one `output` tool action.
    pub fn apply(&mut self, kind: OutputKind, message: &str, context: OutputContext, level: i32) {
        match kind {
            OutputKind::Notify => self.notify(message, level),
            OutputKind::Badge => self.badge(message, context),
            OutputKind::Line => self.line(message, context, level),
            OutputKind::Inline => self.inline(message, context, level),
            OutputKind::Section => self.section(message),
            OutputKind::EndSection => self.end_section(),
        }
    }

    /// Consume the presenter, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn output(&mut self, message: &str, context: OutputContext, level: i32, terminator: &str) {
        if self.is_notifying() {
            self.badge(context.closing_badge(), context);
        }
        if self.level < level {
            return;
        }
        let text = format!("{}{}", self.theme.paint(context, message), terminator);
        self.print_indented(&text);
    }

    fn print_indented(&mut self, text: &str) {
        let indent = " ".repeat(self.state.section * 2);
        write!(self.out, "{}{}", indent, text).ok();
        self.out.flush().ok();
    }
}

/// Prefix every line of `message` with `timestamp` and two spaces.
pub fn format_log_entry(message: &str, timestamp: &DateTime<Local>) -> String {
    let stamp = timestamp.format(LOG_TIMESTAMP_FORMAT).to_string();
    message
        .split('\n')
        .map(|line| format!("{}  {}", stamp, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Append `message` to the log file at `path`, creating parent directories.
pub fn log(path: &Path, message: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }

    let entry = format_log_entry(message, &Local::now());
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", entry)?;
    Ok(())
}
