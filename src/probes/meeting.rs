//! Meeting application probes.
//!
//! Zoom, GoToMeeting and WebEx are detected from their helper processes.
//! Teams is detected either from a display-sleep assertion held by the new
//! Teams client or from the call state the classic client writes to its
//! `storage.json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use serde::Deserialize;

use super::{Probe, ProbeReading};
use crate::error::{AvailableError, Result};
use crate::shell::CommandRunner;

const PGREP: &str = "/usr/bin/pgrep";
const PS: &str = "/bin/ps";
const PMSET: &str = "/usr/bin/pmset";

/// Zoom's screen-share/call host process.
const ZOOM_PROCESS: &str = "CptHost";

/// GoToMeeting's call plugin process, as a `pgrep` pattern.
const GOTOMEETING_PROCESS: &str = "GoTo Helper \\(Plugin\\)";

/// Marker in `ps auxww` output while a WebEx meeting runs.
const WEBEX_MARKER: &str = "(WebexAppLauncher)";

/// Classic Teams state file, relative to the user's home.
const TEAMS_STORAGE: &str = "Library/Application Support/Microsoft/Teams/storage.json";

/// Classic Teams state older than this is ignored.
pub const TEAMS_STORAGE_MAX_AGE: Duration = Duration::from_secs(60 * 60 * 24);

/// Active while Zoom's call host process runs.
pub struct ZoomProbe {
    runner: Rc<dyn CommandRunner>,
}

impl ZoomProbe {
    pub fn new(runner: Rc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl Probe for ZoomProbe {
    fn read(&self) -> ProbeReading {
        ProbeReading::Active(self.runner.run(PGREP, &[ZOOM_PROCESS]).success)
    }
}

/// Active while GoToMeeting's plugin helper runs.
pub struct GoToMeetingProbe {
    runner: Rc<dyn CommandRunner>,
}

impl GoToMeetingProbe {
    pub fn new(runner: Rc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl Probe for GoToMeetingProbe {
    fn read(&self) -> ProbeReading {
        ProbeReading::Active(self.runner.run(PGREP, &[GOTOMEETING_PROCESS]).success)
    }
}

/// Active while a WebEx meeting launcher shows up in the process list.
pub struct WebExProbe {
    runner: Rc<dyn CommandRunner>,
}

impl WebExProbe {
    pub fn new(runner: Rc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl Probe for WebExProbe {
    fn read(&self) -> ProbeReading {
        let result = self.runner.run(PS, &["auxww"]);
        ProbeReading::Active(result.success && result.stdout.contains(WEBEX_MARKER))
    }
}

/// Active while a Teams call is in progress.
pub struct TeamsProbe {
    runner: Rc<dyn CommandRunner>,
    home: Option<PathBuf>,
    max_age: Duration,
}

impl TeamsProbe {
    /// Probe for the user whose home is `home`. Without a home only the
    /// new Teams client can be detected.
    pub fn new(runner: Rc<dyn CommandRunner>, home: Option<PathBuf>) -> Self {
        Self {
            runner,
            home,
            max_age: TEAMS_STORAGE_MAX_AGE,
        }
    }

    /// Override how old the classic state file may be.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    fn work_client_active(&self) -> bool {
        let result = self.runner.run(PMSET, &["-g"]);
        result.success
            && result
                .stdout
                .lines()
                .any(|line| line.contains("display sleep prevented by") && line.contains("MSTeams"))
    }

    fn classic_client_active(&self) -> bool {
        let Some(home) = &self.home else {
            return false;
        };
        let path = home.join(TEAMS_STORAGE);
        if !is_fresh(&path, self.max_age) {
            return false;
        }

        match read_classic_storage(&path) {
            Ok(storage) => storage.in_call(),
            Err(e) => {
                tracing::debug!("{}", e);
                false
            }
        }
    }
}

impl Probe for TeamsProbe {
    fn read(&self) -> ProbeReading {
        ProbeReading::Active(self.work_client_active() || self.classic_client_active())
    }
}

fn is_fresh(path: &Path, max_age: Duration) -> bool {
    let modified = match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => modified,
        Err(_) => return false,
    };
    match SystemTime::now().duration_since(modified) {
        Ok(age) => age <= max_age,
        // Modified in the future (clock skew); treat as current
        Err(_) => true,
    }
}

fn read_classic_storage(path: &Path) -> Result<ClassicStorage> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| AvailableError::Decoder {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// The parts of classic Teams' `storage.json` that track call state.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassicStorage {
    #[serde(default)]
    app_states: Option<AppStates>,
    #[serde(default)]
    web_app_states: Option<AppStates>,
}

impl ClassicStorage {
    fn in_call(&self) -> bool {
        [&self.app_states, &self.web_app_states]
            .into_iter()
            .flatten()
            .any(AppStates::in_call)
    }
}

#[derive(Debug, Default, Deserialize)]
struct AppStates {
    #[serde(default)]
    states: String,
}

impl AppStates {
    /// Whether the most recent call-related state is `InCall`.
    fn in_call(&self) -> bool {
        self.states
            .split(',')
            .map(str::trim)
            .filter_map(|state| match state {
                "InCall" => Some(true),
                "CallEnded" | "Unloaded" | "Interactive" => Some(false),
                _ => None,
            })
            .last()
            .unwrap_or(false)
    }
}
