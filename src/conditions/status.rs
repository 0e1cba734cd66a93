//! Normalized condition results.
//!
//! A probe answers with a [`ProbeReading`]; [`Status::from_reading`] turns it
//! into a [`Status`] with a display value, a blocking flag and a slug. The
//! blocking flag is derived from the display value: empty or
//! [`FALSE_SENTINEL`] never blocks, anything else does.

use super::kind::ConditionKind;

/// Display value of a binary signal that is off.
pub const FALSE_SENTINEL: &str = "False";

/// Display value of a binary signal that is on.
pub const TRUE_VALUE: &str = "True";

/// Raw answer from a probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeReading {
    /// Binary probe: the signal is on or off.
    Active(bool),
    /// Valued probe: what is active (a focus mode, a process, a device).
    /// Empty means inactive.
    Value(String),
}

/// Outcome of evaluating one condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    kind: ConditionKind,
    value: String,
    blocks: bool,
    excepted: bool,
}

impl Status {
    /// Wrap a binary answer as `True`/`False`.
    pub fn from_flag(kind: ConditionKind, active: bool) -> Self {
        let value = if active { TRUE_VALUE } else { FALSE_SENTINEL };
        Self::from_value(kind, value)
    }

    /// Wrap a descriptive value; it blocks unless empty or `False`.
    pub fn from_value(kind: ConditionKind, value: impl Into<String>) -> Self {
        let value = value.into();
        let blocks = !(value.is_empty() || value == FALSE_SENTINEL);
        Self {
            kind,
            value,
            blocks,
            excepted: false,
        }
    }

    /// Apply the kind-specific wrap rule to a probe reading.
    ///
    /// Valued readings that come back empty are shown as `False`.
    pub fn from_reading(kind: ConditionKind, reading: ProbeReading) -> Self {
        match reading {
            ProbeReading::Active(active) => Self::from_flag(kind, active),
            ProbeReading::Value(value) if value.is_empty() => Self::from_flag(kind, false),
            ProbeReading::Value(value) => Self::from_value(kind, value),
        }
    }

    /// Downgrade to non-blocking while keeping the display value.
    pub fn excepted(mut self) -> Self {
        self.excepted = true;
        self
    }

    /// The condition this status belongs to.
    pub fn kind(&self) -> ConditionKind {
        self.kind
    }

    /// Human label.
    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    /// Display value (`True`, `False`, or a descriptive value).
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether this signal makes the user unavailable.
    pub fn blocks_availability(&self) -> bool {
        self.blocks && !self.excepted
    }

    /// Whether an exception rule downgraded this status.
    pub fn is_excepted(&self) -> bool {
        self.excepted
    }

    /// Machine-readable identifier used for terse output.
    pub fn slug(&self) -> String {
        match self.kind {
            ConditionKind::Camera => format!("camera-{}", slug_value(&self.value)),
            ConditionKind::Focus => format!("focus-{}", slug_value(&self.value)),
            ConditionKind::Presenting => "presentation".to_string(),
            ConditionKind::Power => "battery".to_string(),
            kind => kind.raw().to_string(),
        }
    }
}

/// Collapse whitespace runs into single hyphens, keeping case.
fn slug_value(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join("-")
}
