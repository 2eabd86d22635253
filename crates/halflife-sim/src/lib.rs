//! # halflife-sim: continuous-time Monte Carlo decay simulation.
//!
//! - **Channel selection**: a stable isotope yields no decay, a single
//!   channel fires deterministically, two channels are chosen by one uniform
//!   draw on the 0–100 probability scale.
//! - **Trajectories**: each particle starts on isotope 0 and waits an
//!   exponentially distributed time (mean `1/rate`) per decay until it hits
//!   a stable isotope or its next decay falls past the horizon.
//! - **Populations**: particles are independent; each draws from its own
//!   seeded stream, so runs are reproducible sequentially or on any number
//!   of rayon workers.

pub mod population;
pub mod selection;
pub mod streams;
pub mod trajectory;

pub use population::{simulate, CancellationToken, Execution, PopulationSimulator};
pub use selection::select_channel;
pub use streams::{particle_rng, particle_seed};
pub use trajectory::TrajectorySimulator;
