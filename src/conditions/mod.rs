//! Condition catalog and availability evaluation.
//!
//! This module turns a set of requested conditions into one availability
//! verdict with per-condition detail.
//!
//! # Modules
//!
//! - [`kind`] - Condition kinds, scopes and alias expansion
//! - [`status`] - Normalized per-condition results and slugs
//! - [`registry`] - Mapping from condition kind to probe
//! - [`guard`] - Pre-flight permission checks
//! - [`evaluator`] - Evaluation and aggregation
//!
//! # Example
//!
//! ```
//! use available::conditions::{ConditionKind, EvaluationRequest, Evaluator, ProbeTable};
//! use available::probes::ProbeReading;
//!
//! let mut probes = ProbeTable::new();
//! probes.register_reading(ConditionKind::Metered, ProbeReading::Active(false));
//! probes.register_reading(ConditionKind::FileVault, ProbeReading::Active(true));
//! probes.register_reading(ConditionKind::Power, ProbeReading::Active(false));
//!
//! let request = EvaluationRequest::new(&[ConditionKind::System]);
//! let result = Evaluator::new(&probes).evaluate(&request);
//! assert!(!result.available);
//! assert_eq!(result.first_blocking.as_deref(), Some("filevault"));
//! ```

pub mod evaluator;
pub mod guard;
pub mod kind;
pub mod registry;
pub mod status;

pub use evaluator::{
    AggregateResult, ConditionOutcome, EvaluationMode, EvaluationRequest, Evaluator,
    UNREACHABLE_SLUG, UNREACHABLE_VALUE,
};
pub use guard::AccessGuard;
pub use kind::{resolve, ConditionKind};
pub use registry::{ProbeFactory, ProbeTable};
pub use status::{ProbeReading, Status, FALSE_SENTINEL, TRUE_VALUE};
