//! Presentation detection from display-sleep assertions.
//!
//! Presentation apps, screen sharing and video players hold a power
//! assertion that keeps the display awake. `pmset -g assertions` lists
//! them; the first one that is not audio or a browser video wake lock is
//! taken as a presentation and reported by process name.

use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;

use super::{Probe, ProbeReading};
use crate::shell::CommandRunner;

const PMSET: &str = "/usr/bin/pmset";

/// Assertion types that keep the display awake.
const DISPLAY_ASSERTIONS: &[&str] = &["NoDisplaySleepAssertion", "PreventUserIdleDisplaySleep"];

/// Assertion holders that never count as presenting.
const IGNORED_HOLDERS: &[&str] = &["coreaudiod", "Video Wake Lock"];

/// Extracts the process name from `pid 123(Keynote):`.
static HOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"pid [0-9]+\(([^)]+)\):").expect("HOLDER_REGEX must compile")
});

/// Reports the process holding a display-sleep assertion, if any.
pub struct PresentationProbe {
    runner: Rc<dyn CommandRunner>,
}

impl PresentationProbe {
    pub fn new(runner: Rc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl Probe for PresentationProbe {
    fn read(&self) -> ProbeReading {
        let result = self.runner.run(PMSET, &["-g", "assertions"]);
        if !result.success {
            return ProbeReading::Value(String::new());
        }
        ProbeReading::Value(presenting_process(&result.stdout).unwrap_or_default())
    }
}

/// Find the first display-sleep assertion holder in `pmset -g assertions`
/// output.
///
/// Summary lines (`PreventUserIdleDisplaySleep    1`) are skipped. When a
/// line has no `pid N(name):` part the remaining text is returned as is.
pub fn presenting_process(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        if !DISPLAY_ASSERTIONS.iter().any(|a| line.contains(a)) {
            return None;
        }

        let rest = DISPLAY_ASSERTIONS
            .iter()
            .fold(line.to_string(), |acc, a| acc.replace(a, ""));
        let rest = rest.trim();

        if rest.is_empty() || rest == "0" || rest == "1" {
            return None;
        }
        if IGNORED_HOLDERS.iter().any(|h| rest.contains(h)) {
            return None;
        }

        match HOLDER_REGEX.captures(rest) {
            Some(caps) => Some(caps[1].to_string()),
            None => Some(rest.to_string()),
        }
    })
}
