//! Probe registry.
//!
//! Maps each concrete [`ConditionKind`] to a probe constructor. The evaluator
//! only ever asks the table for a probe, so tests can register fakes and the
//! binaries register host probes with [`ProbeTable::host`].

use std::collections::HashMap;
use std::rc::Rc;

use super::kind::ConditionKind;
use crate::probes::{
    CameraProbe, FileVaultProbe, FocusProbe, GoToMeetingProbe, MeteredNetworkProbe,
    PresentationProbe, Probe, ProbeReading, PowerProbe, StaticProbe, TeamsProbe, WebExProbe,
    ZoomProbe,
};
use crate::shell::{CommandRunner, SystemRunner};
use crate::users::Principal;

/// Builds a probe for one evaluation, given the target principal if any.
pub type ProbeFactory = Box<dyn Fn(Option<&Principal>) -> Box<dyn Probe>>;

/// Table of probe constructors keyed by condition kind.
#[derive(Default)]
pub struct ProbeTable {
    factories: HashMap<ConditionKind, ProbeFactory>,
}

impl ProbeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a probe constructor for `kind`, replacing any previous one.
    pub fn register<F>(&mut self, kind: ConditionKind, factory: F) -> &mut Self
    where
        F: Fn(Option<&Principal>) -> Box<dyn Probe> + 'static,
    {
        self.factories.insert(kind, Box::new(factory));
        self
    }

    /// Register a probe that always answers `reading`.
    pub fn register_reading(&mut self, kind: ConditionKind, reading: ProbeReading) -> &mut Self {
        self.register(kind, move |_| Box::new(StaticProbe(reading.clone())))
    }

    /// Whether a constructor is registered for `kind`.
    pub fn contains(&self, kind: ConditionKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Build the probe for `kind`.
    pub fn probe_for(
        &self,
        kind: ConditionKind,
        principal: Option<&Principal>,
    ) -> Option<Box<dyn Probe>> {
        self.factories.get(&kind).map(|factory| factory(principal))
    }

    /// Table of host probes backed by real system utilities.
    pub fn host() -> Self {
        Self::with_runner(Rc::new(SystemRunner))
    }

    /// Table of host probes that run utilities through `runner`.
    pub fn with_runner(runner: Rc<dyn CommandRunner>) -> Self {
        let mut table = Self::new();

        let r = Rc::clone(&runner);
        table.register(ConditionKind::Camera, move |_| {
            Box::new(CameraProbe::host(Rc::clone(&r)))
        });

        let r = Rc::clone(&runner);
        table.register(ConditionKind::Zoom, move |_| {
            Box::new(ZoomProbe::new(Rc::clone(&r)))
        });

        let r = Rc::clone(&runner);
        table.register(ConditionKind::GoToMeeting, move |_| {
            Box::new(GoToMeetingProbe::new(Rc::clone(&r)))
        });

        let r = Rc::clone(&runner);
        table.register(ConditionKind::Teams, move |principal| {
            Box::new(TeamsProbe::new(
                Rc::clone(&r),
                principal.map(|p| p.home.clone()),
            ))
        });

        let r = Rc::clone(&runner);
        table.register(ConditionKind::WebEx, move |_| {
            Box::new(WebExProbe::new(Rc::clone(&r)))
        });

        let r = Rc::clone(&runner);
        table.register(ConditionKind::Presenting, move |_| {
            Box::new(PresentationProbe::new(Rc::clone(&r)))
        });

        table.register(ConditionKind::Focus, |principal| {
            Box::new(FocusProbe::new(principal.map(|p| p.home.clone())))
        });

        let r = Rc::clone(&runner);
        table.register(ConditionKind::FileVault, move |_| {
            Box::new(FileVaultProbe::new(Rc::clone(&r)))
        });

        let r = Rc::clone(&runner);
        table.register(ConditionKind::Power, move |_| {
            Box::new(PowerProbe::host(Rc::clone(&r)))
        });

        let r = Rc::clone(&runner);
        table.register(ConditionKind::Metered, move |_| {
            Box::new(MeteredNetworkProbe::new(Rc::clone(&r)))
        });

        table
    }
}
