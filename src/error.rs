//! Error types for availability checks.
//!
//! This module defines [`AvailableError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Permission and user-resolution errors are fatal and surface before any
//!   probe runs.
//! - Probes never return errors. A preference file that cannot be decoded is
//!   reported as [`AvailableError::Decoder`] inside the probe, logged, and the
//!   signal reads as inactive.
//! - Use `anyhow::Error` (via `AvailableError::Other`) for unexpected errors.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for availability checks.
#[derive(Debug, Error)]
pub enum AvailableError {
    /// A privilege-gated condition was requested for another user without access.
    #[error("You must run this tool as a superuser to use the --{condition} flag.")]
    PermissionDenied { condition: String },

    /// The named user is not a valid target.
    #[error("Invalid user: {user}")]
    InvalidUser { user: String },

    /// The named user has no resolvable home directory.
    #[error("Could not find home directory for user: {user}")]
    InvalidHome { user: String },

    /// A vendor preference file exists but could not be parsed.
    #[error("Could not decode {path}: {message}")]
    Decoder { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AvailableError {
    /// Whether this error is a validation failure that happens before evaluation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied { .. } | Self::InvalidUser { .. } | Self::InvalidHome { .. }
        )
    }
}

/// Result type alias for availability operations.
pub type Result<T> = std::result::Result<T, AvailableError>;
