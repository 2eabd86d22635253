//! Simulation configuration and results.
//!
//! A [`SimulationConfig`] is validated once at construction and read-only
//! afterwards. It is persisted next to the event stream so downstream tools
//! can recover isotope names without the original chain definition.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::event::DecayEvent;
use crate::model::{BranchingPolicy, DecayChain};

/// Everything needed to reproduce one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    decay_chain: DecayChain,
    num_particles: u64,
    /// Horizon in seconds.
    total_time: f64,
    /// Base name of the output files.
    output: String,
    /// Master seed from which every particle's random stream is derived.
    #[serde(default)]
    seed: u64,
}

impl SimulationConfig {
    pub fn new(
        decay_chain: DecayChain,
        num_particles: u64,
        total_time: f64,
        output: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            decay_chain,
            num_particles,
            total_time,
            output: output.into(),
            seed: 0,
        };
        config.check_run_parameters()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn check_run_parameters(&self) -> Result<(), ConfigError> {
        if self.num_particles == 0 {
            return Err(ConfigError::ZeroParticles);
        }
        if !(self.total_time.is_finite() && self.total_time > 0.0) {
            return Err(ConfigError::NonPositiveHorizon(self.total_time));
        }
        if self.output.trim().is_empty() {
            return Err(ConfigError::EmptyOutput);
        }
        Ok(())
    }

    /// Full check, including the chain structure.
    ///
    /// Branching sums are checked permissively: a config that was accepted
    /// once is not rejected on reload.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check_run_parameters()?;
        self.decay_chain.validate(BranchingPolicy::Permissive)?;
        Ok(())
    }

    pub fn decay_chain(&self) -> &DecayChain {
        &self.decay_chain
    }

    pub fn num_particles(&self) -> u64 {
        self.num_particles
    }

    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// The config of a run plus every event it produced, grouped by particle.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResults {
    config: SimulationConfig,
    events: Vec<DecayEvent>,
}

impl SimulationResults {
    pub fn new(config: SimulationConfig, events: Vec<DecayEvent>) -> Self {
        Self { config, events }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Events in particle-index order; not globally sorted by time.
    pub fn events(&self) -> &[DecayEvent] {
        &self.events
    }

    pub fn into_parts(self) -> (SimulationConfig, Vec<DecayEvent>) {
        (self.config, self.events)
    }

    /// A copy of the events sorted by time. Ties keep particle order.
    pub fn events_by_time(&self) -> Vec<DecayEvent> {
        let mut sorted = self.events.clone();
        sorted.sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(Ordering::Equal));
        sorted
    }

    /// Number of distinct particles that decayed at least once. Does not
    /// depend on event order.
    pub fn decayed_particles(&self) -> usize {
        self.events
            .iter()
            .map(|e| e.particle)
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn total_energy(&self) -> f64 {
        self.events.iter().map(|e| e.energy).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DecayChainBuilder, DecayMode};

    fn chain() -> DecayChain {
        let mut b = DecayChainBuilder::new();
        b.add_decay("A", "B", DecayMode::Alpha, 100.0, 1.0, 5.0).unwrap();
        b.build().unwrap()
    }

    fn event(particle: u64, time: f64) -> DecayEvent {
        DecayEvent {
            particle,
            from_isotope: 0,
            to_isotope: 1,
            time,
            energy: 5.0,
        }
    }

    #[test]
    fn valid_config() {
        let cfg = SimulationConfig::new(chain(), 10, 3.0, "run").unwrap().with_seed(9);
        assert_eq!(cfg.num_particles(), 10);
        assert_eq!(cfg.total_time(), 3.0);
        assert_eq!(cfg.output(), "run");
        assert_eq!(cfg.seed(), 9);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_particles_rejected() {
        assert_eq!(
            SimulationConfig::new(chain(), 0, 3.0, "run"),
            Err(ConfigError::ZeroParticles)
        );
    }

    #[test]
    fn bad_horizon_rejected() {
        for horizon in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                SimulationConfig::new(chain(), 1, horizon, "run"),
                Err(ConfigError::NonPositiveHorizon(_))
            ));
        }
    }

    #[test]
    fn empty_output_rejected() {
        assert_eq!(
            SimulationConfig::new(chain(), 1, 1.0, "  "),
            Err(ConfigError::EmptyOutput)
        );
    }

    #[test]
    fn events_by_time_sorts_across_particles() {
        let cfg = SimulationConfig::new(chain(), 3, 10.0, "run").unwrap();
        let results = SimulationResults::new(cfg, vec![event(0, 4.0), event(1, 1.0), event(2, 2.0)]);
        let times: Vec<_> = results.events_by_time().iter().map(|e| e.time).collect();
        assert_eq!(times, vec![1.0, 2.0, 4.0]);
        // the stored order is untouched
        assert_eq!(results.events()[0].particle, 0);
    }

    #[test]
    fn counts_decayed_particles_and_energy() {
        let cfg = SimulationConfig::new(chain(), 5, 10.0, "run").unwrap();
        let results = SimulationResults::new(cfg, vec![event(0, 1.0), event(0, 2.0), event(3, 1.5)]);
        assert_eq!(results.decayed_particles(), 2);
        assert_eq!(results.total_energy(), 15.0);
    }

    #[test]
    fn decayed_particles_ignores_event_order() {
        let cfg = SimulationConfig::new(chain(), 5, 10.0, "run").unwrap();
        let interleaved = vec![event(0, 1.0), event(3, 1.5), event(0, 2.0), event(3, 2.5)];
        let results = SimulationResults::new(cfg, interleaved);
        assert_eq!(results.decayed_particles(), 2);
        let sorted = SimulationResults::new(results.config().clone(), results.events_by_time());
        assert_eq!(sorted.decayed_particles(), 2);
    }

    #[test]
    fn config_serde_round_trip() {
        let cfg = SimulationConfig::new(chain(), 10, 3.0, "run").unwrap().with_seed(42);
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
