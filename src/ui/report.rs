//! Rendering of evaluation results for the `available` tool.

use std::io::Write;

use super::presenter::{OutputContext, Presenter, DEFAULT_LEVEL};
use crate::conditions::{AggregateResult, ConditionOutcome, EvaluationRequest};

/// How much of a result to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStyle {
    /// Nothing; the exit code carries the verdict.
    Quiet,
    /// The first blocking slug, or a blank line when available.
    Terse,
    /// One notify/badge row per condition.
    Verbose,
}

impl ReportStyle {
    /// Style implied by a request's quiet flag and verbosity.
    pub fn for_request(request: &EvaluationRequest) -> Self {
        if request.is_quiet() {
            Self::Quiet
        } else if request.verbosity() > 0 {
            Self::Verbose
        } else {
            Self::Terse
        }
    }
}

/// Badge context for one outcome: red when it blocks or could not be
/// checked, green otherwise.
pub fn outcome_context(outcome: &ConditionOutcome) -> OutputContext {
    if outcome.blocks_availability() || outcome.is_unreachable() {
        OutputContext::Error
    } else {
        OutputContext::Success
    }
}

/// Print one condition as `Label....... [value]`.
pub fn render_outcome<W: Write>(presenter: &mut Presenter<W>, outcome: &ConditionOutcome) {
    presenter.notify(outcome.label(), DEFAULT_LEVEL);
    presenter.badge(outcome.value(), outcome_context(outcome));
}

/// Print `result` in `style`.
pub fn render_result<W: Write>(
    presenter: &mut Presenter<W>,
    result: &AggregateResult,
    style: ReportStyle,
) {
    match style {
        ReportStyle::Quiet => {}
        ReportStyle::Terse => match (&result.first_blocking, result.available) {
            (Some(slug), false) => presenter.line(slug, OutputContext::Default, DEFAULT_LEVEL),
            _ => presenter.blank_line(DEFAULT_LEVEL),
        },
        ReportStyle::Verbose => {
            presenter.blank_line(DEFAULT_LEVEL);
            for outcome in &result.outcomes {
                render_outcome(presenter, outcome);
            }
            presenter.blank_line(DEFAULT_LEVEL);
        }
    }
}
