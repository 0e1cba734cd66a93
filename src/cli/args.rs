//! CLI argument definitions.
//!
//! This module defines the arguments of both binaries using clap's derive
//! macros: [`AvailableCli`] for `available` and [`OutputCli`] for `output`.

use clap::{ArgAction, ArgGroup, Parser};
use std::path::PathBuf;

use crate::conditions::ConditionKind;
use crate::ui::{OutputContext, OutputKind};

/// Focus mode excluded by `--no-work` and `--recommended`.
pub const WORK_FOCUS: &str = "Work";

/// Conditions selected by `--recommended`.
pub const RECOMMENDED: [ConditionKind; 4] = [
    ConditionKind::Camera,
    ConditionKind::Presenting,
    ConditionKind::Focus,
    ConditionKind::FileVault,
];

/// Evaluates whether the console user is available for interaction.
///
/// Exits 0 when available and 1 when not. Without any condition flags the
/// user conditions are evaluated.
#[derive(Debug, Default, Parser)]
#[command(name = "available")]
#[command(author, version, about, long_about = None)]
pub struct AvailableCli {
    #[arg(long, help = ConditionKind::Camera.help(), help_heading = "Conditions")]
    pub camera: bool,

    #[arg(long, help = ConditionKind::Zoom.help(), help_heading = "Conditions")]
    pub zoom: bool,

    #[arg(long, help = ConditionKind::GoToMeeting.help(), help_heading = "Conditions")]
    pub gotomeeting: bool,

    #[arg(long, help = ConditionKind::Teams.help(), help_heading = "Conditions")]
    pub teams: bool,

    #[arg(long, help = ConditionKind::WebEx.help(), help_heading = "Conditions")]
    pub webex: bool,

    #[arg(long, help = ConditionKind::Presenting.help(), help_heading = "Conditions")]
    pub presenting: bool,

    #[arg(long, help = ConditionKind::Focus.help(), help_heading = "Conditions")]
    pub focus: bool,

    #[arg(long, help = ConditionKind::FileVault.help(), help_heading = "Conditions")]
    pub filevault: bool,

    #[arg(long, help = ConditionKind::Power.help(), help_heading = "Conditions")]
    pub power: bool,

    #[arg(long, help = ConditionKind::Metered.help(), help_heading = "Conditions")]
    pub metered: bool,

    #[arg(long = "user", help = ConditionKind::User.help(), help_heading = "Conditions")]
    pub user_conditions: bool,

    #[arg(long, help = ConditionKind::System.help(), help_heading = "Conditions")]
    pub system: bool,

    #[arg(long, help = ConditionKind::All.help(), help_heading = "Conditions")]
    pub all: bool,

    /// Evaluate camera, presenting, focus and filevault, ignoring the 'Work' focus mode
    #[arg(long, help_heading = "Conditions")]
    pub recommended: bool,

    /// Exclude the 'Work' focus mode when evaluating focus mode
    #[arg(long, alias = "nowork")]
    pub no_work: bool,

    /// Exclude a focus mode when evaluating focus mode (repeatable)
    #[arg(long, value_name = "MODE")]
    pub exclude_focus: Vec<String>,

    /// User to evaluate (defaults to the console user)
    #[arg(value_name = "USERNAME", env = "AVAILABLE_USER")]
    pub username: Option<String>,

    /// No output; exits with error status if the user is unavailable
    #[arg(short, long)]
    pub quiet: bool,

    /// Display details of all conditions
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl AvailableCli {
    /// Requested condition kinds in flag order, before alias expansion.
    pub fn requested_kinds(&self) -> Vec<ConditionKind> {
        let flags = [
            (self.camera, ConditionKind::Camera),
            (self.zoom, ConditionKind::Zoom),
            (self.gotomeeting, ConditionKind::GoToMeeting),
            (self.teams, ConditionKind::Teams),
            (self.webex, ConditionKind::WebEx),
            (self.presenting, ConditionKind::Presenting),
            (self.focus, ConditionKind::Focus),
            (self.filevault, ConditionKind::FileVault),
            (self.power, ConditionKind::Power),
            (self.metered, ConditionKind::Metered),
            (self.user_conditions, ConditionKind::User),
            (self.system, ConditionKind::System),
            (self.all, ConditionKind::All),
        ];

        let mut kinds: Vec<ConditionKind> = flags
            .into_iter()
            .filter(|(set, _)| *set)
            .map(|(_, kind)| kind)
            .collect();
        if self.recommended {
            kinds.extend(RECOMMENDED);
        }
        if kinds.is_empty() {
            kinds.push(ConditionKind::User);
        }
        kinds
    }

    /// Focus modes that never block.
    pub fn excluded_focus(&self) -> Vec<String> {
        let mut modes = Vec::new();
        if self.no_work || self.recommended {
            modes.push(WORK_FOCUS.to_string());
        }
        for mode in &self.exclude_focus {
            if !modes.contains(mode) {
                modes.push(mode.clone());
            }
        }
        modes
    }
}

/// Prints stateful, colorized output for shell scripts.
///
/// Section depth and open notifies are remembered between invocations.
#[derive(Debug, Default, Parser)]
#[command(name = "output")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("kind").multiple(false)))]
#[command(group(ArgGroup::new("context").multiple(false)))]
pub struct OutputCli {
    /// Message (or badge text) to print
    #[arg(default_value = "", hide_default_value = true)]
    pub message: String,

    /// Print a dot-padded label and wait for a badge
    #[arg(long, group = "kind", help_heading = "Output type")]
    pub notify: bool,

    /// Close an open notify with [MESSAGE]
    #[arg(long, group = "kind", help_heading = "Output type")]
    pub badge: bool,

    /// Print a full line (default)
    #[arg(long, group = "kind", help_heading = "Output type")]
    pub line: bool,

    /// Print without a line break
    #[arg(long, group = "kind", help_heading = "Output type")]
    pub inline: bool,

    /// Print a section title and indent what follows
    #[arg(long, group = "kind", help_heading = "Output type")]
    pub section: bool,

    /// Leave the current section
    #[arg(long, group = "kind", help_heading = "Output type")]
    pub endsection: bool,

    /// Green
    #[arg(long, group = "context", help_heading = "Context")]
    pub success: bool,

    /// Red
    #[arg(long, group = "context", help_heading = "Context")]
    pub error: bool,

    /// Magenta
    #[arg(long, group = "context", help_heading = "Context")]
    pub msg: bool,

    /// Cyan
    #[arg(long, group = "context", help_heading = "Context")]
    pub info: bool,

    /// Uncolored (default)
    #[arg(long = "default", group = "context", help_heading = "Context")]
    pub default_context: bool,

    /// Append the message to a timestamped log file instead
    #[arg(long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Show the message at every verbosity except fully quiet
    #[arg(short, long)]
    pub quiet: bool,

    /// Only show the message at higher verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl OutputCli {
    /// Selected output type.
    pub fn kind(&self) -> OutputKind {
        if self.notify {
            OutputKind::Notify
        } else if self.badge {
            OutputKind::Badge
        } else if self.inline {
            OutputKind::Inline
        } else if self.section {
            OutputKind::Section
        } else if self.endsection {
            OutputKind::EndSection
        } else {
            OutputKind::Line
        }
    }

    /// Selected color context.
    pub fn context(&self) -> OutputContext {
        if self.success {
            OutputContext::Success
        } else if self.error {
            OutputContext::Error
        } else if self.msg {
            OutputContext::Msg
        } else if self.info {
            OutputContext::Info
        } else {
            OutputContext::Default
        }
    }

    /// Level of this message: 1 plus the `-v` count, or 0 with `--quiet`.
    pub fn message_level(&self) -> i32 {
        if self.quiet {
            0
        } else {
            i32::from(self.verbose) + 1
        }
    }
}
