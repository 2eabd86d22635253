//! # halflife-core
//! Foundation types and traits for decay-chain simulation.
//!
//! - [`model`]: isotopes, decay channels and the index-addressed chain arena
//! - [`time`]: time units and half-life parsing
//! - [`event`]: decay events and per-particle trajectories
//! - [`config`]: validated simulation configuration and results
//! - [`traits`]: the per-particle simulator seam used by the population driver

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod model;
pub mod time;
pub mod traits;

pub use config::{SimulationConfig, SimulationResults};
pub use error::{ChainError, ConfigError, HalflifeError, SimulationError, TrajectoryError};
pub use event::{DecayEvent, StopReason, Trajectory};
pub use model::{
    BranchingPolicy, ChainSpec, DecayChain, DecayChainBuilder, DecayChannel, DecayChannels,
    DecayMode, DecaySpec, Isotope, IsotopeIndex,
};
