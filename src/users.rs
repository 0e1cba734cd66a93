//! Principal resolution.
//!
//! User-scoped conditions run against a [`Principal`]: the console user, or a
//! user named on the command line. Host lookups go through the
//! [`UserDirectory`] trait so the access guard and evaluator can be tested
//! without a real login session.

use std::path::{Path, PathBuf};

use crate::error::{AvailableError, Result};

/// Usernames that never count as a console user.
const INVALID_USERS: &[&str] = &["loginwindow", "root"];

/// Whether `username` can be the target of user-scoped checks.
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty() && !INVALID_USERS.contains(&username)
}

/// The user context against which user-scoped probes run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Login name.
    pub username: String,
    /// Home directory.
    pub home: PathBuf,
}

impl Principal {
    /// Create a principal from known parts.
    pub fn new(username: impl Into<String>, home: impl Into<PathBuf>) -> Self {
        Self {
            username: username.into(),
            home: home.into(),
        }
    }

    /// Look up a named user, failing if the name is invalid or has no home.
    pub fn lookup(username: &str, users: &dyn UserDirectory) -> Result<Self> {
        if !is_valid_username(username) {
            return Err(AvailableError::InvalidUser {
                user: username.to_string(),
            });
        }

        let home = users
            .home_dir(username)
            .ok_or_else(|| AvailableError::InvalidHome {
                user: username.to_string(),
            })?;

        Ok(Self::new(username, home))
    }

    /// The current console user, if one is logged in and resolvable.
    pub fn from_console(users: &dyn UserDirectory) -> Option<Self> {
        let username = users.console_user()?;
        if !is_valid_username(&username) {
            tracing::debug!("Ignoring console user '{}'", username);
            return None;
        }

        match Self::lookup(&username, users) {
            Ok(principal) => Some(principal),
            Err(e) => {
                tracing::debug!("Console user unusable: {}", e);
                None
            }
        }
    }

    /// Resolve the target principal: the named user when given, else the console user.
    pub fn resolve(named: Option<&str>, users: &dyn UserDirectory) -> Result<Option<Self>> {
        match named {
            Some(username) => Self::lookup(username, users).map(Some),
            None => Ok(Self::from_console(users)),
        }
    }

    /// Path inside the principal's home directory.
    pub fn home_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.home.join(relative)
    }
}

/// Host user database.
pub trait UserDirectory {
    /// The user currently logged in at the console.
    fn console_user(&self) -> Option<String>;

    /// Home directory for `username`.
    fn home_dir(&self, username: &str) -> Option<PathBuf>;

    /// The identity running this process.
    fn invoking_user(&self) -> Option<String>;

    /// Whether the invoking identity can read the directory at `path`.
    fn can_read(&self, path: &Path) -> bool {
        std::fs::read_dir(path).is_ok()
    }
}

/// [`UserDirectory`] backed by the host's passwd database.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemUsers;

impl UserDirectory for SystemUsers {
    fn console_user(&self) -> Option<String> {
        host::console_user()
    }

    fn home_dir(&self, username: &str) -> Option<PathBuf> {
        host::home_dir(username)
    }

    fn invoking_user(&self) -> Option<String> {
        host::invoking_user()
    }
}

/// Pick the graphical session owner out of `who` output.
///
/// Sessions on an X display (`:0`), a seat, or the console count.
pub fn console_user_from_who(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        let user = fields.next()?;
        let tty = fields.next()?;
        let graphical = tty.starts_with(':')
            || tty.starts_with("seat")
            || tty == "console"
            || line.trim_end().ends_with("(:0)");
        graphical.then(|| user.to_string())
    })
}

#[cfg(unix)]
mod host {
    use std::ffi::{CStr, CString, OsStr};
    use std::os::unix::ffi::OsStrExt;
    use std::path::PathBuf;

    pub fn home_dir(username: &str) -> Option<PathBuf> {
        let name = CString::new(username).ok()?;
        // SAFETY: getpwnam returns null or a pointer to static storage that
        // stays valid until the next passwd call; the path is copied out
        // before returning.
        unsafe {
            let pw = libc::getpwnam(name.as_ptr());
            if pw.is_null() || (*pw).pw_dir.is_null() {
                return None;
            }
            let dir = CStr::from_ptr((*pw).pw_dir);
            Some(PathBuf::from(OsStr::from_bytes(dir.to_bytes())))
        }
    }

    pub fn username_for_uid(uid: libc::uid_t) -> Option<String> {
        // SAFETY: same contract as getpwnam above; the name is copied out.
        unsafe {
            let pw = libc::getpwuid(uid);
            if pw.is_null() || (*pw).pw_name.is_null() {
                return None;
            }
            Some(CStr::from_ptr((*pw).pw_name).to_string_lossy().into_owned())
        }
    }

    pub fn invoking_user() -> Option<String> {
        // SAFETY: geteuid() is a simple syscall that returns the effective user ID
        let uid = unsafe { libc::geteuid() };
        username_for_uid(uid).or_else(|| std::env::var("USER").ok())
    }

    #[cfg(target_os = "macos")]
    pub fn console_user() -> Option<String> {
        use std::os::unix::fs::MetadataExt;

        let uid = std::fs::metadata("/dev/console").ok()?.uid();
        username_for_uid(uid)
    }

    #[cfg(not(target_os = "macos"))]
    pub fn console_user() -> Option<String> {
        let result = crate::shell::execute("who", &[]);
        if !result.success {
            return None;
        }
        super::console_user_from_who(&result.stdout)
    }
}

#[cfg(not(unix))]
mod host {
    use std::path::PathBuf;

    pub fn home_dir(_username: &str) -> Option<PathBuf> {
        None
    }

    pub fn invoking_user() -> Option<String> {
        std::env::var("USERNAME").ok()
    }

    pub fn console_user() -> Option<String> {
        invoking_user()
    }
}

/// In-memory [`UserDirectory`] for tests.
#[derive(Debug, Clone, Default)]
pub struct MockUsers {
    /// Console user returned by `console_user`.
    pub console: Option<String>,
    /// Identity returned by `invoking_user`.
    pub invoking: Option<String>,
    /// Known users and their home directories.
    pub homes: Vec<(String, PathBuf)>,
    /// Paths reported as readable.
    pub readable: Vec<PathBuf>,
}

impl MockUsers {
    /// A host with `username` logged in at the console and running the tool.
    pub fn logged_in(username: &str, home: impl Into<PathBuf>) -> Self {
        Self {
            console: Some(username.to_string()),
            invoking: Some(username.to_string()),
            homes: vec![(username.to_string(), home.into())],
            readable: Vec::new(),
        }
    }

    /// A host at the login window, with the tool run by `invoking`.
    pub fn nobody_logged_in(invoking: &str) -> Self {
        Self {
            console: Some("loginwindow".to_string()),
            invoking: Some(invoking.to_string()),
            ..Default::default()
        }
    }
}

impl UserDirectory for MockUsers {
    fn console_user(&self) -> Option<String> {
        self.console.clone()
    }

    fn home_dir(&self, username: &str) -> Option<PathBuf> {
        self.homes
            .iter()
            .find(|(name, _)| name == username)
            .map(|(_, home)| home.clone())
    }

    fn invoking_user(&self) -> Option<String> {
        self.invoking.clone()
    }

    fn can_read(&self, path: &Path) -> bool {
        self.readable.iter().any(|p| p == path)
    }
}
