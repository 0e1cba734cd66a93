//! Status command implementation.
//!
//! The `available` binary runs this command: it checks the requested
//! conditions for the target user and reports the verdict.

use std::io::Write;

use crate::cli::args::AvailableCli;
use crate::conditions::{AccessGuard, EvaluationRequest, Evaluator, ProbeTable};
use crate::error::Result;
use crate::shell::SystemRunner;
use crate::state::PresenterState;
use crate::ui::{
    render_result, should_use_colors, OutputTheme, Presenter, ReportStyle, DEFAULT_LEVEL,
};
use crate::users::{Principal, SystemUsers, UserDirectory};

use super::dispatcher::{Command, CommandResult};

/// The status command implementation.
pub struct StatusCommand {
    args: AvailableCli,
    users: Box<dyn UserDirectory>,
    probes: ProbeTable,
    colors: bool,
}

impl StatusCommand {
    /// Create a status command backed by the host's users and probes.
    pub fn new(args: AvailableCli) -> Self {
        let colors = should_use_colors(args.no_color, &SystemRunner);
        Self {
            args,
            users: Box::new(SystemUsers),
            probes: ProbeTable::host(),
            colors,
        }
    }

    /// Resolve users through `users` instead of the host.
    pub fn with_users(mut self, users: impl UserDirectory + 'static) -> Self {
        self.users = Box::new(users);
        self
    }

    /// Evaluate conditions with `probes` instead of the host probes.
    pub fn with_probes(mut self, probes: ProbeTable) -> Self {
        self.probes = probes;
        self
    }

    /// Force colored output on or off.
    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    /// Get the command arguments.
    pub fn args(&self) -> &AvailableCli {
        &self.args
    }

    /// Build the evaluation request for `principal`.
    pub fn request(&self, principal: Option<Principal>) -> EvaluationRequest {
        EvaluationRequest::new(&self.args.requested_kinds())
            .with_excluded_focus(self.args.excluded_focus())
            .with_principal(principal)
            .with_quiet(self.args.quiet)
            .with_verbosity(self.args.verbose)
    }
}

impl Command for StatusCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let users = self.users.as_ref();
        let principal = Principal::resolve(self.args.username.as_deref(), users)?;

        let requested = self.args.requested_kinds();
        AccessGuard::new(users).authorize(
            &requested,
            users.invoking_user().as_deref(),
            principal.as_ref(),
        )?;

        match &principal {
            Some(p) => tracing::debug!("Evaluating {:?} for {}", requested, p.username),
            None => tracing::debug!("Evaluating {:?} with no console user", requested),
        }

        let request = self.request(principal);
        let result = Evaluator::new(&self.probes).evaluate(&request);

        let style = ReportStyle::for_request(&request);
        let mut presenter = Presenter::new(
            out,
            OutputTheme::for_colors(self.colors),
            DEFAULT_LEVEL,
            PresenterState::default(),
        );
        if style == ReportStyle::Quiet {
            presenter.quiet();
        }
        render_result(&mut presenter, &result, style);

        Ok(CommandResult::from_exit_code(result.exit_code()))
    }
}
