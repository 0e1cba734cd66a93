//! Availability evaluation.
//!
//! The [`Evaluator`] walks the resolved conditions of an
//! [`EvaluationRequest`], probes each reachable one, applies the focus-mode
//! exclusion list and folds the results into an [`AggregateResult`].
//!
//! # Modes
//!
//! - [`EvaluationMode::Terse`] stops at the first blocking condition. Fewer
//!   probes run, and that first condition is all terse output reports. An
//!   unreachable condition makes the user unavailable but the remaining
//!   conditions are still checked.
//! - [`EvaluationMode::Full`] evaluates every requested condition. An
//!   unreachable condition is recorded but does not mark the user
//!   unavailable.
//!
//! Whether the process exits, and with what code, is decided by the caller
//! from the returned result.

use super::kind::{self, ConditionKind};
use super::registry::ProbeTable;
use super::status::Status;
use crate::users::Principal;

/// Slug reported when a condition could not be checked at all.
pub const UNREACHABLE_SLUG: &str = "none";

/// Display value for a user-scoped condition with no principal.
pub const UNREACHABLE_VALUE: &str = "No User";

/// How much of the request to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationMode {
    /// Stop at the first blocking condition; unreachable ones fail the run.
    #[default]
    Terse,
    /// Evaluate and report every condition.
    Full,
}

/// A resolved set of conditions to check, plus modifiers.
#[derive(Debug, Clone, Default)]
pub struct EvaluationRequest {
    kinds: Vec<ConditionKind>,
    excluded_focus: Vec<String>,
    principal: Option<Principal>,
    quiet: bool,
    verbosity: u8,
}

impl EvaluationRequest {
    /// Resolve `requested` (aliases allowed) into concrete kinds.
    pub fn new(requested: &[ConditionKind]) -> Self {
        Self {
            kinds: kind::resolve(requested),
            ..Default::default()
        }
    }

    /// Focus modes that never block.
    pub fn with_excluded_focus<I, S>(mut self, modes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_focus = modes.into_iter().map(Into::into).collect();
        self
    }

    /// Target user for user-scoped conditions.
    pub fn with_principal(mut self, principal: Option<Principal>) -> Self {
        self.principal = principal;
        self
    }

    /// Suppress all output.
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Verbosity level (count of `-v`).
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Concrete kinds in evaluation order.
    pub fn kinds(&self) -> &[ConditionKind] {
        &self.kinds
    }

    /// Focus modes that never block.
    pub fn excluded_focus(&self) -> &[String] {
        &self.excluded_focus
    }

    /// Target principal, if any.
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Whether output is suppressed.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Verbosity level.
    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    /// Evaluation mode implied by the verbosity level.
    pub fn mode(&self) -> EvaluationMode {
        if self.verbosity > 0 {
            EvaluationMode::Full
        } else {
            EvaluationMode::Terse
        }
    }
}

/// Outcome for one requested condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionOutcome {
    /// The condition was probed.
    Evaluated(Status),
    /// A user-scoped condition with no principal to probe.
    Unreachable(ConditionKind),
}

impl ConditionOutcome {
    /// The condition this outcome belongs to.
    pub fn kind(&self) -> ConditionKind {
        match self {
            Self::Evaluated(status) => status.kind(),
            Self::Unreachable(kind) => *kind,
        }
    }

    /// Human label.
    pub fn label(&self) -> &'static str {
        self.kind().label()
    }

    /// Display value; unreachable conditions show [`UNREACHABLE_VALUE`].
    pub fn value(&self) -> &str {
        match self {
            Self::Evaluated(status) => status.value(),
            Self::Unreachable(_) => UNREACHABLE_VALUE,
        }
    }

    /// Whether this outcome blocks availability.
    pub fn blocks_availability(&self) -> bool {
        match self {
            Self::Evaluated(status) => status.blocks_availability(),
            Self::Unreachable(_) => false,
        }
    }

    /// Whether the condition could not be checked.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }

    /// Machine-readable identifier.
    pub fn slug(&self) -> String {
        match self {
            Self::Evaluated(status) => status.slug(),
            Self::Unreachable(_) => UNREACHABLE_SLUG.to_string(),
        }
    }
}

/// Accumulated result of one evaluation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateResult {
    /// Whether the user is available under every evaluated condition.
    pub available: bool,
    /// Per-condition outcomes in evaluation order.
    pub outcomes: Vec<ConditionOutcome>,
    /// Slug of the first condition that made the user unavailable.
    pub first_blocking: Option<String>,
    /// Whether terse mode stopped before the end of the request.
    pub stopped_early: bool,
}

impl AggregateResult {
    fn new() -> Self {
        Self {
            available: true,
            outcomes: Vec::new(),
            first_blocking: None,
            stopped_early: false,
        }
    }

    fn mark_unavailable(&mut self, slug: String) {
        self.available = false;
        if self.first_blocking.is_none() {
            self.first_blocking = Some(slug);
        }
    }

    /// Process exit code: 0 when available, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.available {
            0
        } else {
            1
        }
    }
}

/// Evaluates requests against a probe table.
pub struct Evaluator<'a> {
    probes: &'a ProbeTable,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator using `probes`.
    pub fn new(probes: &'a ProbeTable) -> Self {
        Self { probes }
    }

    /// Evaluate every condition in `request`, honouring its mode.
    pub fn evaluate(&self, request: &EvaluationRequest) -> AggregateResult {
        let mode = request.mode();
        let mut result = AggregateResult::new();
        let total = request.kinds().len();

        for (index, &kind) in request.kinds().iter().enumerate() {
            let outcome = self.evaluate_one(kind, request);
            tracing::debug!(
                "{}: {} (blocks: {})",
                kind,
                outcome.value(),
                outcome.blocks_availability()
            );

            let stop = match &outcome {
                ConditionOutcome::Unreachable(_) => {
                    if mode == EvaluationMode::Terse {
                        result.mark_unavailable(outcome.slug());
                    }
                    false
                }
                ConditionOutcome::Evaluated(status) => {
                    if status.blocks_availability() {
                        result.mark_unavailable(status.slug());
                    }
                    status.blocks_availability() && mode == EvaluationMode::Terse
                }
            };

            result.outcomes.push(outcome);
            if stop {
                result.stopped_early = index + 1 < total;
                break;
            }
        }

        result
    }

    fn evaluate_one(&self, kind: ConditionKind, request: &EvaluationRequest) -> ConditionOutcome {
        let principal = request.principal();
        if kind.is_user_scoped() && principal.is_none() {
            return ConditionOutcome::Unreachable(kind);
        }

        let status = match self.probes.probe_for(kind, principal) {
            Some(probe) => Status::from_reading(kind, probe.read()),
            None => {
                tracing::warn!("No probe registered for {}, treating as inactive", kind);
                Status::from_flag(kind, false)
            }
        };

        if kind == ConditionKind::Focus
            && request
                .excluded_focus()
                .iter()
                .any(|mode| mode == status.value())
        {
            tracing::debug!("Focus mode '{}' is excluded", status.value());
            return ConditionOutcome::Evaluated(status.excepted());
        }

        ConditionOutcome::Evaluated(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::status::ProbeReading;
    use crate::probes::StaticProbe;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn alice() -> Option<Principal> {
        Some(Principal::new("alice", "/Users/alice"))
    }

    fn quiet_table() -> ProbeTable {
        let mut table = ProbeTable::new();
        for kind in ConditionKind::All.expand() {
            table.register_reading(kind, ProbeReading::Active(false));
        }
        table
    }

    /// Table that records which kinds were probed.
    fn recording_table(log: Rc<RefCell<Vec<ConditionKind>>>, blocking: &[ConditionKind]) -> ProbeTable {
        let mut table = ProbeTable::new();
        for kind in ConditionKind::All.expand() {
            let log = Rc::clone(&log);
            let blocks = blocking.contains(&kind);
            table.register(kind, move |_| {
                log.borrow_mut().push(kind);
                Box::new(StaticProbe::active(blocks))
            });
        }
        table
    }

    #[test]
    fn mode_follows_verbosity() {
        assert_eq!(EvaluationRequest::new(&[]).mode(), EvaluationMode::Terse);
        assert_eq!(
            EvaluationRequest::new(&[]).with_verbosity(2).mode(),
            EvaluationMode::Full
        );
    }

    #[test]
    fn request_resolves_aliases() {
        let request = EvaluationRequest::new(&[ConditionKind::System, ConditionKind::Power]);
        assert_eq!(request.kinds(), ConditionKind::System.expand().as_slice());
    }

    #[test]
    fn nothing_active_is_available() {
        let table = quiet_table();
        let request = EvaluationRequest::new(&[ConditionKind::All]).with_principal(alice());
        let result = Evaluator::new(&table).evaluate(&request);
        assert!(result.available);
        assert_eq!(result.exit_code(), 0);
        assert_eq!(result.outcomes.len(), 10);
        assert!(result.first_blocking.is_none());
    }

    #[test]
    fn excluded_focus_mode_does_not_block() {
        let mut table = quiet_table();
        table.register_reading(ConditionKind::Focus, ProbeReading::Value("Work".into()));
        let request = EvaluationRequest::new(&[ConditionKind::Focus])
            .with_principal(alice())
            .with_excluded_focus(["Work"]);

        let result = Evaluator::new(&table).evaluate(&request);
        assert!(result.available);
        match &result.outcomes[0] {
            ConditionOutcome::Evaluated(status) => {
                assert_eq!(status.value(), "Work");
                assert!(!status.blocks_availability());
            }
            other => panic!("Expected Evaluated, got {:?}", other),
        }
    }

    #[test]
    fn exclusion_only_applies_to_focus() {
        let mut table = quiet_table();
        table.register_reading(ConditionKind::Presenting, ProbeReading::Value("Work".into()));
        let request = EvaluationRequest::new(&[ConditionKind::Presenting])
            .with_principal(alice())
            .with_excluded_focus(["Work"]);

        let result = Evaluator::new(&table).evaluate(&request);
        assert!(!result.available);
        assert_eq!(result.first_blocking.as_deref(), Some("presentation"));
    }

    #[test]
    fn other_focus_mode_blocks() {
        let mut table = quiet_table();
        table.register_reading(ConditionKind::Focus, ProbeReading::Value("Personal".into()));
        let request = EvaluationRequest::new(&[ConditionKind::Focus])
            .with_principal(alice())
            .with_excluded_focus(["Work"]);

        let result = Evaluator::new(&table).evaluate(&request);
        assert!(!result.available);
        assert_eq!(result.first_blocking.as_deref(), Some("focus-Personal"));
    }

    #[test]
    fn terse_mode_stops_at_first_block() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let table = recording_table(Rc::clone(&log), &[ConditionKind::Zoom, ConditionKind::Teams]);
        let request = EvaluationRequest::new(&[ConditionKind::User]).with_principal(alice());

        let result = Evaluator::new(&table).evaluate(&request);
        assert!(!result.available);
        assert!(result.stopped_early);
        assert_eq!(result.first_blocking.as_deref(), Some("zoom"));
        assert_eq!(*log.borrow(), vec![ConditionKind::Camera, ConditionKind::Zoom]);
        assert_eq!(result.outcomes.len(), 2);
    }

    #[test]
    fn full_mode_evaluates_everything_and_keeps_first_slug() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let table = recording_table(Rc::clone(&log), &[ConditionKind::Zoom, ConditionKind::Teams]);
        let request = EvaluationRequest::new(&[ConditionKind::User])
            .with_principal(alice())
            .with_verbosity(1);

        let result = Evaluator::new(&table).evaluate(&request);
        assert!(!result.available);
        assert!(!result.stopped_early);
        assert_eq!(result.first_blocking.as_deref(), Some("zoom"));
        assert_eq!(log.borrow().len(), ConditionKind::User.expand().len());
    }

    #[test]
    fn block_on_last_condition_is_not_early_stop() {
        let mut table = quiet_table();
        table.register_reading(ConditionKind::Metered, ProbeReading::Active(true));
        let request = EvaluationRequest::new(&[ConditionKind::System]);

        let result = Evaluator::new(&table).evaluate(&request);
        assert!(!result.available);
        assert!(!result.stopped_early);
        assert_eq!(result.outcomes.len(), 3);
    }

    #[test]
    fn unreachable_in_terse_mode_fails_but_system_conditions_still_run() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let table = recording_table(Rc::clone(&log), &[]);
        let request = EvaluationRequest::new(&[ConditionKind::All]);

        let result = Evaluator::new(&table).evaluate(&request);
        assert!(!result.available);
        assert_eq!(result.first_blocking.as_deref(), Some(UNREACHABLE_SLUG));
        assert!(!result.stopped_early);
        assert_eq!(*log.borrow(), ConditionKind::System.expand());
        assert_eq!(result.outcomes.len(), 10);
    }

    #[test]
    fn terse_mode_still_stops_at_block_after_unreachable() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let table = recording_table(Rc::clone(&log), &[ConditionKind::FileVault]);
        let request = EvaluationRequest::new(&[ConditionKind::All]);

        let result = Evaluator::new(&table).evaluate(&request);
        assert!(!result.available);
        assert_eq!(result.first_blocking.as_deref(), Some(UNREACHABLE_SLUG));
        assert!(result.stopped_early);
        assert_eq!(*log.borrow(), vec![ConditionKind::FileVault]);
    }

    #[test]
    fn unreachable_in_full_mode_is_reported_and_skipped() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let table = recording_table(Rc::clone(&log), &[]);
        let request = EvaluationRequest::new(&[ConditionKind::All]).with_verbosity(1);

        let result = Evaluator::new(&table).evaluate(&request);
        assert!(result.available);
        assert_eq!(result.outcomes.len(), 10);
        assert_eq!(*log.borrow(), ConditionKind::System.expand());

        let unreachable: Vec<_> = result
            .outcomes
            .iter()
            .filter(|o| o.is_unreachable())
            .map(|o| o.kind())
            .collect();
        assert_eq!(unreachable, ConditionKind::User.expand());
        assert!(result
            .outcomes
            .iter()
            .filter(|o| o.is_unreachable())
            .all(|o| o.value() == UNREACHABLE_VALUE));
    }

    #[test]
    fn system_conditions_need_no_principal() {
        let table = quiet_table();
        let request = EvaluationRequest::new(&[ConditionKind::System]);
        let result = Evaluator::new(&table).evaluate(&request);
        assert!(result.available);
        assert!(result.outcomes.iter().all(|o| !o.is_unreachable()));
    }

    #[test]
    fn missing_probe_reads_as_inactive() {
        let table = ProbeTable::new();
        let request = EvaluationRequest::new(&[ConditionKind::FileVault]);
        let result = Evaluator::new(&table).evaluate(&request);
        assert!(result.available);
        assert_eq!(result.outcomes[0].value(), "False");
    }

    #[test]
    fn empty_request_is_available() {
        let table = quiet_table();
        let result = Evaluator::new(&table).evaluate(&EvaluationRequest::new(&[]));
        assert!(result.available);
        assert!(result.outcomes.is_empty());
    }
}
