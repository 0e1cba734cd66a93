//! Available - console user availability checks for scripts.
//!
//! Management scripts often need to know whether the person at the Mac is
//! busy before they pop a dialog or start a reboot countdown. This crate
//! evaluates a set of host conditions (camera in use, meeting apps, display
//! sleep assertions, focus mode, FileVault encryption, battery power, metered
//! network) for the console user and combines them into one verdict.
//!
//! It also ships a small presenter used by the `output` binary to give shell
//! scripts consistent, colorized, sectioned output.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface for the `available` and `output` binaries
//! - [`conditions`] - Condition kinds, statuses, access checks and the evaluator
//! - [`error`] - Error types and result aliases
//! - [`probes`] - Host probes, one per concrete condition
//! - [`shell`] - Subprocess execution used by probes
//! - [`state`] - Persisted presenter state
//! - [`ui`] - Presenter, colors and result rendering
//! - [`users`] - Console user and home directory resolution
//!
//! # Example
//!
//! ```
//! use available::conditions::{ConditionKind, EvaluationRequest, Evaluator, ProbeReading, ProbeTable};
//!
//! let mut probes = ProbeTable::new();
//! probes.register_reading(ConditionKind::Power, ProbeReading::Active(false));
//! probes.register_reading(ConditionKind::Metered, ProbeReading::Active(true));
//!
//! let request = EvaluationRequest::new(&[ConditionKind::Power, ConditionKind::Metered]);
//! let result = Evaluator::new(&probes).evaluate(&request);
//!
//! assert!(!result.available);
//! assert_eq!(result.first_blocking.as_deref(), Some("metered"));
//! ```

pub mod cli;
pub mod conditions;
pub mod error;
pub mod probes;
pub mod shell;
pub mod state;
pub mod ui;
pub mod users;

pub use error::{AvailableError, Result};
