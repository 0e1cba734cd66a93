//! Condition kinds and their classes.
//!
//! Every checkable signal is a [`ConditionKind`]. Concrete kinds are either
//! user-scoped (they need a console user to probe) or system-scoped. The
//! `user`, `system` and `all` kinds are convenience aliases that expand to
//! concrete kinds before evaluation.

use std::fmt;
use std::str::FromStr;

/// A named checkable signal.
///
/// Declaration order is the canonical evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConditionKind {
    Camera,
    Zoom,
    GoToMeeting,
    Teams,
    WebEx,
    Presenting,
    Focus,
    FileVault,
    Power,
    Metered,
    /// Alias: every user-scoped condition.
    User,
    /// Alias: every system-scoped condition.
    System,
    /// Alias: every condition.
    All,
}

impl ConditionKind {
    /// Every kind, aliases included, in canonical order.
    pub const ALL: [ConditionKind; 13] = [
        ConditionKind::Camera,
        ConditionKind::Zoom,
        ConditionKind::GoToMeeting,
        ConditionKind::Teams,
        ConditionKind::WebEx,
        ConditionKind::Presenting,
        ConditionKind::Focus,
        ConditionKind::FileVault,
        ConditionKind::Power,
        ConditionKind::Metered,
        ConditionKind::User,
        ConditionKind::System,
        ConditionKind::All,
    ];

    /// Stable identifier used in flags and slugs.
    pub fn raw(self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Zoom => "zoom",
            Self::GoToMeeting => "gotomeeting",
            Self::Teams => "teams",
            Self::WebEx => "webex",
            Self::Presenting => "presenting",
            Self::Focus => "focus",
            Self::FileVault => "filevault",
            Self::Power => "power",
            Self::Metered => "metered",
            Self::User => "user",
            Self::System => "system",
            Self::All => "all",
        }
    }

    /// Human label shown in detailed output. Empty for aliases.
    pub fn label(self) -> &'static str {
        match self {
            Self::Camera => "Camera Active",
            Self::Zoom => "Zoom Call Active",
            Self::GoToMeeting => "GoToMeeting Active",
            Self::Teams => "Teams Meeting Active",
            Self::WebEx => "WebEx Call Active",
            Self::Presenting => "Presentation Mode",
            Self::Focus => "Focus Mode",
            Self::FileVault => "FileVault Encrypting",
            Self::Power => "Battery Power",
            Self::Metered => "Metered Network",
            Self::User | Self::System | Self::All => "",
        }
    }

    /// One-line description for `--help`.
    pub fn help(self) -> &'static str {
        match self {
            Self::Camera => "Evaluate Camera Status",
            Self::Zoom => "Evaluate Zoom Meeting Status",
            Self::GoToMeeting => "Evaluate GoToMeeting Status",
            Self::Teams => "Evaluate Microsoft Teams Call Status",
            Self::WebEx => "Evaluate WebEx Call Status",
            Self::Presenting => "Evaluate 'No Sleep' Display Assertions",
            Self::Focus => "Evaluate Focus Mode",
            Self::FileVault => "Evaluate FileVault Encryption Progress",
            Self::Power => "Evaluate AC Power Status",
            Self::Metered => "Evaluate 'Low Data Mode' Connection",
            Self::User => "Evaluate Only User Specific Conditions",
            Self::System => "Evaluate Only System Specific Conditions <filevault, metered, power>",
            Self::All => "Evaluate All Conditions",
        }
    }

    /// Whether this is a convenience alias (`user`, `system`, `all`).
    pub fn is_alias(self) -> bool {
        matches!(self, Self::User | Self::System | Self::All)
    }

    /// Whether this kind probes machine-wide state.
    pub fn is_system_scoped(self) -> bool {
        matches!(self, Self::Metered | Self::FileVault | Self::Power)
    }

    /// Whether this kind needs a console user to probe.
    pub fn is_user_scoped(self) -> bool {
        !self.is_alias() && !self.is_system_scoped()
    }

    /// Whether requesting this kind for another user needs elevated access.
    pub fn requires_privilege(self) -> bool {
        matches!(self, Self::User | Self::Focus | Self::Teams | Self::All)
    }

    /// Concrete kinds this kind stands for, in canonical order.
    pub fn expand(self) -> Vec<ConditionKind> {
        let concrete = Self::ALL.into_iter().filter(|k| !k.is_alias());
        match self {
            Self::All => concrete.collect(),
            Self::User => concrete.filter(|k| k.is_user_scoped()).collect(),
            Self::System => concrete.filter(|k| k.is_system_scoped()).collect(),
            kind => vec![kind],
        }
    }

    /// Look up a kind by its raw identifier.
    pub fn from_raw(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.raw() == raw)
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw())
    }
}

impl FromStr for ConditionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_raw(&s.to_lowercase()).ok_or_else(|| format!("unknown condition: {}", s))
    }
}

/// Expand aliases and deduplicate, yielding concrete kinds in canonical order.
pub fn resolve(requested: &[ConditionKind]) -> Vec<ConditionKind> {
    let mut resolved: Vec<ConditionKind> = requested.iter().flat_map(|k| k.expand()).collect();
    resolved.sort();
    resolved.dedup();
    resolved
}
