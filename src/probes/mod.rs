//! Host probes.
//!
//! Each probe answers one question about host state with a [`ProbeReading`].
//! Binary probes answer [`ProbeReading::Active`]; valued probes answer
//! [`ProbeReading::Value`] with an empty string meaning inactive.
//!
//! Probes are read-only and never fail. Any OS read or subprocess error is
//! reported as "inactive": a missing utility, an unreadable file or an
//! undecodable preference list all read the same as a signal that is off.
//! This is an accepted risk; a broken probe can make a busy user look
//! available, never the reverse.
//!
//! # Modules
//!
//! - [`camera`] - Camera in use
//! - [`display`] - Display sleep prevention (presentations)
//! - [`focus`] - Focus / Do Not Disturb mode
//! - [`meeting`] - Zoom, WebEx, GoToMeeting and Teams calls
//! - [`system`] - FileVault encryption, AC power, metered network

pub mod camera;
pub mod display;
pub mod focus;
pub mod meeting;
pub mod system;

pub use camera::{CameraDevice, CameraProbe, CameraSource};
pub use display::PresentationProbe;
pub use focus::FocusProbe;
pub use meeting::{GoToMeetingProbe, TeamsProbe, WebExProbe, ZoomProbe};
pub use system::{FileVaultProbe, MeteredNetworkProbe, PowerProbe};

pub use crate::conditions::status::ProbeReading;

/// Answers one question about host state.
pub trait Probe {
    /// Perform the read.
    fn read(&self) -> ProbeReading;
}

/// A probe with a fixed answer.
#[derive(Debug, Clone)]
pub struct StaticProbe(pub ProbeReading);

impl StaticProbe {
    /// A binary probe that always answers `active`.
    pub fn active(active: bool) -> Self {
        Self(ProbeReading::Active(active))
    }

    /// A valued probe that always answers `value`.
    pub fn value(value: &str) -> Self {
        Self(ProbeReading::Value(value.to_string()))
    }
}

impl Probe for StaticProbe {
    fn read(&self) -> ProbeReading {
        self.0.clone()
    }
}
