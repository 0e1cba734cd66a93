//! Mock command runner for testing.
//!
//! `MockRunner` implements [`CommandRunner`] with scripted responses and
//! records every invocation for later assertion.
//!
//! # Example
//!
//! ```
//! use available::shell::{CommandRunner, MockRunner};
//!
//! let runner = MockRunner::new();
//! runner.respond("/usr/bin/pmset", "Now drawing from 'AC Power'\n");
//!
//! let result = runner.run("/usr/bin/pmset", &["-g", "ps"]);
//! assert!(result.success);
//! assert!(result.stdout.contains("AC Power"));
//!
//! // Unscripted programs fail, as if they were not installed
//! assert!(!runner.run("/usr/bin/pgrep", &["CptHost"]).success);
//! assert_eq!(runner.calls().len(), 2);
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use super::command::{CommandResult, CommandRunner};

/// Scripted [`CommandRunner`] for tests.
///
/// Responses are keyed by program path. A program without a scripted
/// response fails with no exit code.
#[derive(Debug, Default)]
pub struct MockRunner {
    responses: RefCell<HashMap<String, CommandResult>>,
    existing: RefCell<HashSet<String>>,
    calls: RefCell<Vec<String>>,
}

impl MockRunner {
    /// Create a runner where every program fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful run of `program` printing `stdout`.
    pub fn respond(&self, program: &str, stdout: &str) {
        self.set_result(
            program,
            CommandResult::success(stdout.to_string(), String::new(), Duration::ZERO),
        );
    }

    /// Script a failed run of `program` with the given exit code and stderr.
    pub fn fail(&self, program: &str, code: i32, stderr: &str) {
        self.set_result(
            program,
            CommandResult::failure(Some(code), String::new(), stderr.to_string(), Duration::ZERO),
        );
    }

    /// Script an arbitrary result for `program`.
    pub fn set_result(&self, program: &str, result: CommandResult) {
        self.existing.borrow_mut().insert(program.to_string());
        self.responses
            .borrow_mut()
            .insert(program.to_string(), result);
    }

    /// Mark `path` as existing without scripting a response.
    pub fn mark_existing(&self, path: &str) {
        self.existing.borrow_mut().insert(path.to_string());
    }

    /// Every invocation so far, formatted as `program arg1 arg2`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, program: &str, args: &[&str]) -> CommandResult {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.calls.borrow_mut().push(line);

        self.responses
            .borrow()
            .get(program)
            .cloned()
            .unwrap_or_else(|| CommandResult::not_spawned(format!("{} not scripted", program)))
    }

    fn exists(&self, path: &str) -> bool {
        self.existing.borrow().contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unscripted_program_fails() {
        let runner = MockRunner::new();
        let result = runner.run("/bin/true", &[]);
        assert!(!result.success);
        assert!(result.exit_code.is_none());
    }

    #[test]
    fn scripted_failure_keeps_code() {
        let runner = MockRunner::new();
        runner.fail("/usr/bin/pgrep", 1, "");
        let result = runner.run("/usr/bin/pgrep", &["CptHost"]);
        assert_eq!(result.exit_code, Some(1));
    }

    #[test]
    fn records_calls_with_args() {
        let runner = MockRunner::new();
        runner.run("/usr/bin/pmset", &["-g", "assertions"]);
        assert_eq!(runner.calls(), vec!["/usr/bin/pmset -g assertions"]);
    }

    #[test]
    fn scripted_programs_exist() {
        let runner = MockRunner::new();
        runner.respond("/usr/bin/fdesetup", "FileVault is On.");
        runner.mark_existing("/usr/bin/nscurl");
        assert!(runner.exists("/usr/bin/fdesetup"));
        assert!(runner.exists("/usr/bin/nscurl"));
        assert!(!runner.exists("/usr/bin/pmset"));
    }
}
