//! Pre-flight access checks.
//!
//! Some conditions read another user's preference files. Requesting them for
//! a principal other than yourself requires that you can read the target's
//! home directory, which stands in for "is an administrator". The check runs
//! before any probe does.

use std::path::PathBuf;

use super::kind::ConditionKind;
use crate::error::{AvailableError, Result};
use crate::users::{Principal, UserDirectory};

/// Directory under the target's home used as the readability sentinel.
pub const DEFAULT_SENTINEL: &str = "Desktop";

/// Validates that the invoking identity may evaluate the requested conditions.
pub struct AccessGuard<'a> {
    users: &'a dyn UserDirectory,
    sentinel: PathBuf,
}

impl<'a> AccessGuard<'a> {
    /// Create a guard using the default sentinel directory.
    pub fn new(users: &'a dyn UserDirectory) -> Self {
        Self {
            users,
            sentinel: PathBuf::from(DEFAULT_SENTINEL),
        }
    }

    /// Use a different sentinel path, relative to the target's home.
    pub fn with_sentinel(mut self, sentinel: impl Into<PathBuf>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    /// Check the requested kinds (before alias expansion).
    ///
    /// Fails on the first privilege-gated kind when the invoking identity is
    /// not the target and cannot read the target's sentinel directory.
    pub fn authorize(
        &self,
        requested: &[ConditionKind],
        invoking: Option<&str>,
        target: Option<&Principal>,
    ) -> Result<()> {
        let Some(target) = target else {
            return Ok(());
        };

        if invoking == Some(target.username.as_str()) {
            return Ok(());
        }

        let sentinel = target.home_path(&self.sentinel);
        if self.users.can_read(&sentinel) {
            tracing::debug!(
                "{:?} may act for {} (can read {})",
                invoking,
                target.username,
                sentinel.display()
            );
            return Ok(());
        }

        match requested.iter().find(|k| k.requires_privilege()) {
            Some(kind) => Err(AvailableError::PermissionDenied {
                condition: kind.raw().to_string(),
            }),
            None => Ok(()),
        }
    }
}
