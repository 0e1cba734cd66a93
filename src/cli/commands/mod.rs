//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! - [`status`] - `available`: evaluate conditions and report the verdict
//! - [`output`] - `output`: one stateful presenter action

pub mod dispatcher;
pub mod output;
pub mod status;

pub use dispatcher::{Command, CommandResult};
pub use output::OutputCommand;
pub use status::StatusCommand;
