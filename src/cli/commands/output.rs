//! Output command implementation.
//!
//! The `output` binary runs this command: one presenter action per
//! invocation, with section depth and open notifies carried between runs
//! through a [`StateStore`].

use std::io::Write;

use crate::cli::args::OutputCli;
use crate::error::Result;
use crate::shell::SystemRunner;
use crate::state::{MemoryStateStore, PresenterState, StateStore, YamlStateFile};
use crate::ui::{env_level, log, should_use_colors, OutputTheme, Presenter};

use super::dispatcher::{Command, CommandResult};

/// The output command implementation.
pub struct OutputCommand {
    args: OutputCli,
    store: Box<dyn StateStore>,
    level: i32,
    colors: bool,
}

impl OutputCommand {
    /// Create an output command using the environment's state file and level.
    pub fn new(args: OutputCli) -> Self {
        let store: Box<dyn StateStore> = match YamlStateFile::from_env() {
            Some(file) => {
                tracing::debug!("Using state file {}", file.path().display());
                Box::new(file)
            }
            None => {
                tracing::warn!("No state location; sections and notifies will not persist");
                Box::new(MemoryStateStore::new(PresenterState::default()))
            }
        };
        let colors = should_use_colors(args.no_color, &SystemRunner);

        Self {
            args,
            store,
            level: env_level(),
            colors,
        }
    }

    /// Keep state in `store` instead of the environment's state file.
    pub fn with_store(mut self, store: impl StateStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    /// Use active level `level` instead of the environment's.
    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    /// Force colored output on or off.
    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    /// Get the command arguments.
    pub fn args(&self) -> &OutputCli {
        &self.args
    }
}

impl Command for OutputCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        if let Some(path) = &self.args.log {
            log(path, &self.args.message)?;
            return Ok(CommandResult::success());
        }

        let mut presenter = Presenter::new(
            out,
            OutputTheme::for_colors(self.colors),
            self.level,
            self.store.load(),
        );
        presenter.apply(
            self.args.kind(),
            &self.args.message,
            self.args.context(),
            self.args.message_level(),
        );

        self.store.save(&presenter.state())?;
        Ok(CommandResult::success())
    }
}
