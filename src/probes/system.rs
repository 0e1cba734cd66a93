//! System-wide probes: disk encryption, power source and network cost.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::{Probe, ProbeReading};
use crate::shell::CommandRunner;

const FDESETUP: &str = "/usr/bin/fdesetup";
const PMSET: &str = "/usr/bin/pmset";
const NSCURL: &str = "/usr/bin/nscurl";

/// Endpoint fetched to test whether the network refuses low-data requests.
pub const METERED_TEST_URL: &str = "http://httpstat.us/200";

/// Default sysfs directory listing power supplies.
pub const POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";

/// Active while FileVault is encrypting the disk.
pub struct FileVaultProbe {
    runner: Rc<dyn CommandRunner>,
}

impl FileVaultProbe {
    pub fn new(runner: Rc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl Probe for FileVaultProbe {
    fn read(&self) -> ProbeReading {
        if !self.runner.exists(FDESETUP) {
            return ProbeReading::Active(false);
        }
        let result = self.runner.run(FDESETUP, &["status"]);
        ProbeReading::Active(result.success && result.stdout.contains("Encryption in progress"))
    }
}

/// Active while running on battery.
///
/// Uses `pmset -g ps` where available. Elsewhere, a machine with mains
/// adapters listed in sysfs is on battery when none of them is online. No
/// evidence either way reads as AC power.
pub struct PowerProbe {
    runner: Rc<dyn CommandRunner>,
    supply_root: PathBuf,
}

impl PowerProbe {
    /// Probe reading power supplies from `supply_root` when `pmset` is absent.
    pub fn new(runner: Rc<dyn CommandRunner>, supply_root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            supply_root: supply_root.into(),
        }
    }

    /// Probe using the host's sysfs location.
    pub fn host(runner: Rc<dyn CommandRunner>) -> Self {
        Self::new(runner, POWER_SUPPLY_ROOT)
    }

    fn on_ac_power(&self) -> bool {
        if self.runner.exists(PMSET) {
            let result = self.runner.run(PMSET, &["-g", "ps"]);
            return !result.success || result.stdout.contains("AC Power");
        }
        mains_online(&self.supply_root).unwrap_or(true)
    }
}

impl Probe for PowerProbe {
    fn read(&self) -> ProbeReading {
        ProbeReading::Active(!self.on_ac_power())
    }
}

/// Whether any mains adapter under `root` is online.
///
/// Returns `None` when there are no mains adapters to ask.
fn mains_online(root: &Path) -> Option<bool> {
    let entries = fs::read_dir(root).ok()?;
    let mut saw_mains = false;

    for entry in entries.flatten() {
        let dir = entry.path();
        let kind = read_trimmed(&dir.join("type"));
        if kind.as_deref() != Some("Mains") {
            continue;
        }
        saw_mains = true;
        if read_trimmed(&dir.join("online")).as_deref() == Some("1") {
            return Some(true);
        }
    }

    if saw_mains {
        Some(false)
    } else {
        None
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

/// Active when the current network is marked expensive or low-data.
///
/// `nscurl` refuses such networks when asked not to use them and says so in
/// its output.
pub struct MeteredNetworkProbe {
    runner: Rc<dyn CommandRunner>,
}

impl MeteredNetworkProbe {
    pub fn new(runner: Rc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl Probe for MeteredNetworkProbe {
    fn read(&self) -> ProbeReading {
        let result = self.runner.run(
            NSCURL,
            &[
                "--max-time",
                "1",
                "--insecure",
                "--no-constrained",
                "--no-expensive",
                "-o",
                "/dev/null",
                METERED_TEST_URL,
            ],
        );
        let constrained = result.mentions("constrained");
        let expensive = result.mentions("expensive");
        tracing::debug!("network constrained: {}, expensive: {}", constrained, expensive);
        ProbeReading::Active(constrained || expensive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::MockRunner;
    use tempfile::TempDir;

    fn supply(root: &Path, name: &str, kind: &str, online: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("type"), format!("{}\n", kind)).unwrap();
        fs::write(dir.join("online"), format!("{}\n", online)).unwrap();
    }

    #[test]
    fn filevault_encrypting() {
        let runner = Rc::new(MockRunner::new());
        runner.respond(FDESETUP, "Encryption in progress: Percent completed = 42.1\n");
        assert_eq!(FileVaultProbe::new(runner).read(), ProbeReading::Active(true));
    }

    #[test]
    fn filevault_on_is_not_encrypting() {
        let runner = Rc::new(MockRunner::new());
        runner.respond(FDESETUP, "FileVault is On.\n");
        assert_eq!(FileVaultProbe::new(runner).read(), ProbeReading::Active(false));
    }

    #[test]
    fn filevault_missing_tool_is_not_run() {
        let runner = Rc::new(MockRunner::new());
        assert_eq!(
            FileVaultProbe::new(runner.clone()).read(),
            ProbeReading::Active(false)
        );
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn pmset_ac_power() {
        let runner = Rc::new(MockRunner::new());
        runner.respond(PMSET, "Now drawing from 'AC Power'\n -InternalBattery-0 100%\n");
        let probe = PowerProbe::new(runner, "/nonexistent");
        assert_eq!(probe.read(), ProbeReading::Active(false));
    }

    #[test]
    fn pmset_battery_power() {
        let runner = Rc::new(MockRunner::new());
        runner.respond(PMSET, "Now drawing from 'Battery Power'\n -InternalBattery-0 80%\n");
        let probe = PowerProbe::new(runner, "/nonexistent");
        assert_eq!(probe.read(), ProbeReading::Active(true));
    }

    #[test]
    fn pmset_failure_reads_as_ac() {
        let runner = Rc::new(MockRunner::new());
        runner.fail(PMSET, 1, "");
        let probe = PowerProbe::new(runner, "/nonexistent");
        assert_eq!(probe.read(), ProbeReading::Active(false));
    }

    #[test]
    fn sysfs_mains_online() {
        let root = TempDir::new().unwrap();
        supply(root.path(), "BAT0", "Battery", "0");
        supply(root.path(), "AC", "Mains", "1");
        let probe = PowerProbe::new(Rc::new(MockRunner::new()), root.path());
        assert_eq!(probe.read(), ProbeReading::Active(false));
    }

    #[test]
    fn sysfs_mains_offline_means_battery() {
        let root = TempDir::new().unwrap();
        supply(root.path(), "BAT0", "Battery", "1");
        supply(root.path(), "AC", "Mains", "0");
        let probe = PowerProbe::new(Rc::new(MockRunner::new()), root.path());
        assert_eq!(probe.read(), ProbeReading::Active(true));
    }

    #[test]
    fn no_power_evidence_reads_as_ac() {
        let root = TempDir::new().unwrap();
        let probe = PowerProbe::new(Rc::new(MockRunner::new()), root.path());
        assert_eq!(probe.read(), ProbeReading::Active(false));

        let probe = PowerProbe::new(Rc::new(MockRunner::new()), "/nonexistent/power");
        assert_eq!(probe.read(), ProbeReading::Active(false));
    }

    #[test]
    fn metered_when_constrained_mentioned() {
        let runner = Rc::new(MockRunner::new());
        runner.fail(
            NSCURL,
            1,
            "Error Domain=NSURLErrorDomain Code=-1009 \"The request was constrained\"",
        );
        assert_eq!(
            MeteredNetworkProbe::new(runner.clone()).read(),
            ProbeReading::Active(true)
        );
        assert!(runner.calls()[0].ends_with(METERED_TEST_URL));
    }

    #[test]
    fn metered_when_expensive_mentioned() {
        let runner = Rc::new(MockRunner::new());
        runner.respond(NSCURL, "network is expensive\n");
        assert_eq!(
            MeteredNetworkProbe::new(runner).read(),
            ProbeReading::Active(true)
        );
    }

    #[test]
    fn unmetered_network() {
        let runner = Rc::new(MockRunner::new());
        runner.respond(NSCURL, "");
        assert_eq!(
            MeteredNetworkProbe::new(runner).read(),
            ProbeReading::Active(false)
        );
    }
}
