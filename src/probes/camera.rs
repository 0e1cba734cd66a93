//! Camera usage detection.
//!
//! A [`CameraSource`] enumerates video capture devices and whether each is
//! in use. The probe reports the name of the last device in use.
//!
//! - Linux: device names come from `/sys/class/video4linux/*/name`; a device
//!   is in use when any process holds an open descriptor on its `/dev` node.
//! - macOS: names come from `system_profiler -json SPCameraDataType`; usage
//!   is inferred from open files of the camera assistant services, which
//!   cannot be tied to a single device, so every camera is marked in use.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::Deserialize;

use super::{Probe, ProbeReading};
use crate::shell::CommandRunner;

/// Name reported for an active camera that has no name.
pub const UNKNOWN_CAMERA: &str = "Unknown";

const SYSTEM_PROFILER: &str = "/usr/sbin/system_profiler";
const LSOF: &str = "/usr/sbin/lsof";

/// Open files of these services mean a camera is streaming.
const CAMERA_SERVICES: &[&str] = &["AppleCamera", "VDC", "iSight"];

/// A video capture device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    /// Device name; may be empty.
    pub name: String,
    /// Whether some process is using the device.
    pub in_use: bool,
}

/// Enumerates cameras.
pub trait CameraSource {
    fn devices(&self) -> Vec<CameraDevice>;
}

/// Name of the last in-use device, or `None` when no device is in use.
pub fn active_camera(devices: &[CameraDevice]) -> Option<String> {
    devices.iter().rev().find(|d| d.in_use).map(|d| {
        if d.name.trim().is_empty() {
            UNKNOWN_CAMERA.to_string()
        } else {
            d.name.trim().to_string()
        }
    })
}

/// Reports the active camera's name.
pub struct CameraProbe {
    source: Box<dyn CameraSource>,
}

impl CameraProbe {
    pub fn new(source: Box<dyn CameraSource>) -> Self {
        Self { source }
    }

    /// Probe using the host's camera source.
    #[cfg(target_os = "macos")]
    pub fn host(runner: Rc<dyn CommandRunner>) -> Self {
        Self::new(Box::new(MacCameras::new(runner)))
    }

    /// Probe using the host's camera source.
    #[cfg(not(target_os = "macos"))]
    pub fn host(_runner: Rc<dyn CommandRunner>) -> Self {
        Self::new(Box::new(V4lCameras::host()))
    }
}

impl Probe for CameraProbe {
    fn read(&self) -> ProbeReading {
        ProbeReading::Value(active_camera(&self.source.devices()).unwrap_or_default())
    }
}

/// Video4Linux cameras.
#[derive(Debug, Clone)]
pub struct V4lCameras {
    sys_root: PathBuf,
    dev_root: PathBuf,
    proc_root: PathBuf,
}

impl V4lCameras {
    pub fn new(
        sys_root: impl Into<PathBuf>,
        dev_root: impl Into<PathBuf>,
        proc_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            sys_root: sys_root.into(),
            dev_root: dev_root.into(),
            proc_root: proc_root.into(),
        }
    }

    pub fn host() -> Self {
        Self::new("/sys/class/video4linux", "/dev", "/proc")
    }

    /// Every path some process has an open descriptor on.
    fn open_files(&self) -> HashSet<PathBuf> {
        let mut open = HashSet::new();
        let Ok(processes) = fs::read_dir(&self.proc_root) else {
            return open;
        };

        for process in processes.flatten() {
            let is_pid = process
                .file_name()
                .to_str()
                .is_some_and(|n| n.chars().all(|c| c.is_ascii_digit()));
            if !is_pid {
                continue;
            }
            // Other users' descriptors are unreadable without privileges
            let Ok(fds) = fs::read_dir(process.path().join("fd")) else {
                continue;
            };
            open.extend(fds.flatten().filter_map(|fd| fs::read_link(fd.path()).ok()));
        }
        open
    }
}

impl CameraSource for V4lCameras {
    fn devices(&self) -> Vec<CameraDevice> {
        let Ok(entries) = fs::read_dir(&self.sys_root) else {
            return Vec::new();
        };
        let mut nodes: Vec<String> = entries
            .flatten()
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|n| n.starts_with("video"))
            .collect();
        if nodes.is_empty() {
            return Vec::new();
        }
        nodes.sort();

        let open = self.open_files();
        nodes
            .into_iter()
            .map(|node| {
                let name = read_name(&self.sys_root.join(&node).join("name"));
                let in_use = open.contains(&self.dev_root.join(&node));
                CameraDevice { name, in_use }
            })
            .collect()
    }
}

fn read_name(path: &Path) -> String {
    fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// macOS cameras via `system_profiler` and `lsof`.
pub struct MacCameras {
    runner: Rc<dyn CommandRunner>,
}

#[derive(Debug, Deserialize)]
struct ProfilerReport {
    #[serde(rename = "SPCameraDataType", default)]
    cameras: Vec<ProfilerCamera>,
}

#[derive(Debug, Deserialize)]
struct ProfilerCamera {
    #[serde(rename = "_name", default)]
    name: String,
}

impl MacCameras {
    pub fn new(runner: Rc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn names(&self) -> Vec<String> {
        let result = self
            .runner
            .run(SYSTEM_PROFILER, &["-json", "SPCameraDataType"]);
        if !result.success {
            return Vec::new();
        }
        match serde_json::from_str::<ProfilerReport>(&result.stdout) {
            Ok(report) => report.cameras.into_iter().map(|c| c.name).collect(),
            Err(e) => {
                tracing::debug!("Could not decode system_profiler output: {}", e);
                Vec::new()
            }
        }
    }

    fn streaming(&self) -> bool {
        let result = self.runner.run(LSOF, &["-n", "-P"]);
        result.success
            && result
                .stdout
                .lines()
                .any(|line| CAMERA_SERVICES.iter().any(|s| line.contains(s)))
    }
}

impl CameraSource for MacCameras {
    fn devices(&self) -> Vec<CameraDevice> {
        let names = self.names();
        if names.is_empty() {
            return Vec::new();
        }
        let in_use = self.streaming();
        names
            .into_iter()
            .map(|name| CameraDevice { name, in_use })
            .collect()
    }
}
