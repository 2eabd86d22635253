//! Trait interfaces between the model and the simulation engine.
//!
//! - [`ParticleSimulator`]: drives one particle through a chain
//!   (halflife-sim implements it; the population driver consumes it)

use rand::RngCore;

use crate::error::TrajectoryError;
use crate::event::Trajectory;

/// Simulation of a single, independent particle.
///
/// Implementations read shared, immutable state only; all randomness comes
/// from the caller-provided generator, so a particle's trajectory is fully
/// determined by the generator's seed.
pub trait ParticleSimulator: Send + Sync {
    /// Run particle `particle` from the start isotope until it reaches a
    /// stable isotope or its next decay falls past the horizon.
    ///
    /// `particle` is a label copied into each event, never a seed.
    fn simulate_particle(
        &self,
        particle: u64,
        rng: &mut dyn RngCore,
    ) -> Result<Trajectory, TrajectoryError>;
}
