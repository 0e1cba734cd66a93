//! Terminal capability detection.
//!
//! Color is used only when the terminal type is known, is not a dumb
//! terminal, and advertises at least 8 colors. `NO_COLOR` always wins.

use crate::shell::CommandRunner;

const TPUT: &str = "/usr/bin/tput";

/// Minimum number of colors needed for styled output.
pub const MIN_COLORS: u32 = 8;

/// Broad terminal families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    /// No escape sequence support (`dumb`, `cons25`, `emacs`, or unset).
    Dumb,
    Xterm,
    Other,
}

/// The terminal described by `TERM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    name: String,
    kind: TerminalKind,
}

impl Terminal {
    /// Classify a `TERM` value.
    pub fn from_term(term: Option<&str>) -> Self {
        let name = term.map(|t| t.trim().to_lowercase()).unwrap_or_default();
        let kind = if name.is_empty() || matches!(name.as_str(), "dumb" | "cons25" | "emacs") {
            TerminalKind::Dumb
        } else if name.contains("xterm") {
            TerminalKind::Xterm
        } else {
            TerminalKind::Other
        };
        let name = if name.is_empty() {
            "dumb".to_string()
        } else {
            name
        };
        Self { name, kind }
    }

    /// The terminal described by the `TERM` environment variable.
    pub fn detect() -> Self {
        Self::from_term(std::env::var("TERM").ok().as_deref())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TerminalKind {
        self.kind
    }

    pub fn is_dumb(&self) -> bool {
        self.kind == TerminalKind::Dumb
    }

    /// Colors for well-known terminal names.
    pub fn known_colors(&self) -> u32 {
        match self.name.as_str() {
            "xterm" => 8,
            "xterm-16color" => 16,
            "xterm-256color" => 256,
            _ => 0,
        }
    }

    /// Number of colors, asking `tput` first.
    pub fn colors(&self, runner: &dyn CommandRunner) -> u32 {
        if self.is_dumb() {
            return 0;
        }
        let terminal = format!("-T{}", self.name);
        let result = runner.run(TPUT, &[terminal.as_str(), "colors"]);
        if result.success {
            if let Ok(colors) = result.stdout.trim().parse::<i64>() {
                return colors.max(0) as u32;
            }
        }
        self.known_colors()
    }

    /// Whether styled output should be written to this terminal.
    pub fn supports_color(&self, runner: &dyn CommandRunner) -> bool {
        !self.is_dumb() && self.colors(runner) >= MIN_COLORS
    }
}

/// Whether colors should be enabled for this process.
pub fn should_use_colors(no_color_flag: bool, runner: &dyn CommandRunner) -> bool {
    // Check NO_COLOR env var (https://no-color.org/)
    if no_color_flag || std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    Terminal::detect().supports_color(runner)
}
