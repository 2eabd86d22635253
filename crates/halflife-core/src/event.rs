//! Decay events and per-particle trajectories.

use serde::{Deserialize, Serialize};

use crate::model::IsotopeIndex;

/// One decay experienced by one particle.
///
/// `time` is in seconds from the particle's own start at `t = 0`,
/// `energy` in MeV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayEvent {
    pub particle: u64,
    pub from_isotope: IsotopeIndex,
    pub to_isotope: IsotopeIndex,
    pub time: f64,
    pub energy: f64,
}

/// Why a particle's trajectory ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StopReason {
    /// The particle sits on an isotope with no decay channels.
    ReachedStableIsotope,
    /// The next decay would happen after the time horizon; it was discarded.
    ExceededTimeHorizon,
}

/// The time-ordered events of one particle and how its simulation ended.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub particle: u64,
    pub events: Vec<DecayEvent>,
    pub stop: StopReason,
}

impl Trajectory {
    /// Isotope the particle occupies at the end of the horizon.
    pub fn final_isotope(&self, start: IsotopeIndex) -> IsotopeIndex {
        self.events.last().map_or(start, |e| e.to_isotope)
    }

    pub fn released_energy(&self) -> f64 {
        self.events.iter().map(|e| e.energy).sum()
    }
}
