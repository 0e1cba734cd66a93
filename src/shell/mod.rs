//! Subprocess execution for probes.

pub mod command;
pub mod mock;

pub use command::{execute, CommandResult, CommandRunner, SystemRunner};
pub use mock::MockRunner;
