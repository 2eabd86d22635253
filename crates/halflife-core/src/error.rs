//! Error types for decay-chain construction and simulation.
use thiserror::Error;

use crate::model::DecayMode;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainError {
    #[error("unknown time unit: {0} (expected ns, s, min, h, d or a)")] UnknownTimeUnit(String),
    #[error("malformed duration: {0:?} (expected \"<number> <unit>\")")] MalformedDuration(String),
    #[error("half-life must be positive and finite, got {0}")] NonPositiveHalfLife(f64),
    #[error("rate must be positive and finite, got {0}")] NonPositiveRate(f64),
    #[error("probability {0} outside [0, 100]")] InvalidProbability(f64),
    #[error("energy must be finite and non-negative, got {0}")] InvalidEnergy(f64),
    #[error("empty isotope name")] EmptyName,
    #[error("decay chain has no isotopes")] EmptyChain,
    #[error("isotope {isotope} {mode} channel targets index {to}, chain has {len} isotopes")] DanglingChannel { isotope: usize, mode: DecayMode, to: usize, len: usize },
    #[error("isotope {index} is stored at position {position}")] MisplacedIsotope { index: usize, position: usize },
    #[error("branching probabilities of {name} sum to {sum}, expected 100")] UnbalancedBranching { name: String, sum: f64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error(transparent)] Chain(#[from] ChainError),
    #[error("particle count must be positive")] ZeroParticles,
    #[error("time horizon must be positive and finite, got {0}")] NonPositiveHorizon(f64),
    #[error("empty output identifier")] EmptyOutput,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrajectoryError {
    #[error("isotope {isotope} has invalid decay rate {rate}")] InvalidRate { isotope: usize, rate: f64 },
    #[error("isotope {isotope} produced non-finite waiting time {value}")] NonFiniteWaitingTime { isotope: usize, value: f64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("particle {particle}: {source}")] Particle { particle: u64, source: TrajectoryError },
    #[error("cancelled after {completed} particles")] Cancelled { completed: u64 },
    #[error("thread pool: {0}")] ThreadPool(String),
}

#[derive(Error, Debug)]
pub enum HalflifeError {
    #[error(transparent)] Chain(#[from] ChainError),
    #[error(transparent)] Config(#[from] ConfigError),
    #[error(transparent)] Trajectory(#[from] TrajectoryError),
    #[error(transparent)] Simulation(#[from] SimulationError),
}
