//! Presenter state persistence.
//!
//! The `output` tool is invoked once per message, so the section depth and
//! any open notify have to survive between processes. They are stored as a
//! small YAML document:
//!
//! ```yaml
//! section: 1
//! notifying: 2
//! ```

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AvailableError, Result};

/// File name under the state directory.
pub const STATE_FILE_NAME: &str = "output.yml";

/// Presenter counters carried across invocations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenterState {
    /// Indentation depth; each level indents by two spaces.
    #[serde(default)]
    pub section: usize,

    /// Level of the open notify waiting for a badge; 0 when none is open.
    #[serde(default)]
    pub notifying: i32,
}

/// Load/save pair for [`PresenterState`].
pub trait StateStore {
    /// Read the stored state. Never fails; anything unreadable is the default.
    fn load(&self) -> PresenterState;

    /// Persist `state`.
    fn save(&self, state: &PresenterState) -> Result<()>;
}

/// State kept in a YAML file.
#[derive(Debug, Clone)]
pub struct YamlStateFile {
    path: PathBuf,
}

impl YamlStateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// State file at the default location for this environment.
    pub fn from_env() -> Option<Self> {
        default_state_path(
            std::env::var_os("OUTPUT_STATE_FILE"),
            std::env::var_os("XDG_STATE_HOME"),
            std::env::var_os("HOME"),
        )
        .map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<PresenterState> {
        if !self.path.exists() {
            return Ok(PresenterState::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(PresenterState::default());
        }
        serde_yaml::from_str(&content).map_err(|e| AvailableError::Decoder {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

impl StateStore for YamlStateFile {
    fn load(&self) -> PresenterState {
        self.read().unwrap_or_else(|e| {
            tracing::warn!("Resetting output state: {}", e);
            PresenterState::default()
        })
    }

    /// Uses the write-to-temp-then-rename pattern to prevent corruption.
    fn save(&self, state: &PresenterState) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let content = serde_yaml::to_string(state)
            .map_err(|e| anyhow::anyhow!("Failed to serialize output state: {}", e))?;

        let temp_path = self.path.with_extension("yml.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}

/// In-memory state, for tests and for runs with nowhere to persist.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: RefCell<PresenterState>,
}

impl MemoryStateStore {
    pub fn new(state: PresenterState) -> Self {
        Self {
            state: RefCell::new(state),
        }
    }

    pub fn get(&self) -> PresenterState {
        *self.state.borrow()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> PresenterState {
        self.get()
    }

    fn save(&self, state: &PresenterState) -> Result<()> {
        *self.state.borrow_mut() = *state;
        Ok(())
    }
}

/// Resolve the state file location.
///
/// An explicit file wins, then `$XDG_STATE_HOME/available/`, then
/// `$HOME/.local/state/available/`. Empty values are ignored.
pub fn default_state_path(
    explicit: Option<OsString>,
    xdg_state_home: Option<OsString>,
    home: Option<OsString>,
) -> Option<PathBuf> {
    let non_empty = |v: Option<OsString>| v.filter(|s| !s.is_empty()).map(PathBuf::from);

    if let Some(path) = non_empty(explicit) {
        return Some(path);
    }
    if let Some(dir) = non_empty(xdg_state_home) {
        return Some(dir.join("available").join(STATE_FILE_NAME));
    }
    non_empty(home).map(|h| {
        h.join(".local")
            .join("state")
            .join("available")
            .join(STATE_FILE_NAME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_default() {
        let temp = TempDir::new().unwrap();
        let store = YamlStateFile::new(temp.path().join("output.yml"));
        assert_eq!(store.load(), PresenterState::default());
    }

    #[test]
    fn save_and_load() {
        let temp = TempDir::new().unwrap();
        let store = YamlStateFile::new(temp.path().join("nested/dir/output.yml"));
        let state = PresenterState {
            section: 2,
            notifying: 1,
        };

        store.save(&state).unwrap();
        assert_eq!(store.load(), state);
    }

    #[test]
    fn save_uses_atomic_write() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("output.yml");
        let store = YamlStateFile::new(&path);
        store.save(&PresenterState::default()).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("yml.tmp").exists());
    }

    #[test]
    fn corrupt_file_loads_default() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("output.yml");
        fs::write(&path, "section: [not a number").unwrap();
        assert_eq!(YamlStateFile::new(&path).load(), PresenterState::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("output.yml");
        fs::write(&path, "section: 3\n").unwrap();
        let state = YamlStateFile::new(&path).load();
        assert_eq!(state.section, 3);
        assert_eq!(state.notifying, 0);
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStateStore::default();
        store
            .save(&PresenterState {
                section: 1,
                notifying: 2,
            })
            .unwrap();
        assert_eq!(store.load().notifying, 2);
    }

    #[test]
    fn explicit_state_path_wins() {
        let path = default_state_path(
            Some("/tmp/state.yml".into()),
            Some("/xdg".into()),
            Some("/home/alice".into()),
        );
        assert_eq!(path, Some(PathBuf::from("/tmp/state.yml")));
    }

    #[test]
    fn xdg_state_home_used_next() {
        let path = default_state_path(Some("".into()), Some("/xdg".into()), Some("/home/alice".into()));
        assert_eq!(path, Some(PathBuf::from("/xdg/available/output.yml")));
    }

    #[test]
    fn home_fallback() {
        let path = default_state_path(None, None, Some("/home/alice".into()));
        assert_eq!(
            path,
            Some(PathBuf::from("/home/alice/.local/state/available/output.yml"))
        );
        assert_eq!(default_state_path(None, None, None), None);
    }
}
