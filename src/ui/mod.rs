//! Terminal output.
//!
//! This module provides:
//! - [`Presenter`] for verbosity-filtered, sectioned output with notify/badge pairs
//! - [`OutputTheme`] colors and [`Terminal`] capability detection
//! - [`report`] rendering of evaluation results

pub mod presenter;
pub mod report;
pub mod terminal;
pub mod theme;

pub use presenter::{
    env_level, level_from_env, log, OutputContext, OutputKind, Presenter, DEFAULT_LEVEL,
    LINE_WIDTH, QUIET_LEVEL,
};
pub use report::{render_outcome, render_result, ReportStyle};
pub use terminal::{should_use_colors, Terminal, TerminalKind};
pub use theme::OutputTheme;
