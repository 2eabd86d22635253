//! Population driver: runs every particle of a [`SimulationConfig`] and
//! concatenates their events.
//!
//! Particles are independent and the chain is immutable, so the fan-out
//! needs no locking. Each particle draws from its own stream
//! (see [`crate::streams`]); results do not depend on the execution mode.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use halflife_core::error::{HalflifeError, SimulationError};
use halflife_core::event::{DecayEvent, Trajectory};
use halflife_core::traits::ParticleSimulator;
use halflife_core::{SimulationConfig, SimulationResults};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, info};

use crate::streams::particle_rng;
use crate::trajectory::TrajectorySimulator;

/// How particles are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    /// One particle after another on the calling thread.
    Sequential,
    /// On rayon workers. `threads: None` uses the global pool, `Some(n)`
    /// builds a dedicated pool of `n` threads for the run.
    Parallel { threads: Option<usize> },
}

impl Default for Execution {
    fn default() -> Self {
        Self::Parallel { threads: None }
    }
}

impl fmt::Display for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => f.write_str("sequential"),
            Self::Parallel { threads: None } => f.write_str("parallel"),
            Self::Parallel { threads: Some(n) } => write!(f, "parallel({n} threads)"),
        }
    }
}

/// Cooperative cancellation, checked before each particle starts.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Runs the per-particle simulator over `0..num_particles`.
#[derive(Debug, Clone)]
pub struct PopulationSimulator<'a> {
    config: &'a SimulationConfig,
    execution: Execution,
    cancel: CancellationToken,
}

impl<'a> PopulationSimulator<'a> {
    pub fn new(config: &'a SimulationConfig) -> Self {
        Self {
            config,
            execution: Execution::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Simulate the whole population with [`TrajectorySimulator`].
    pub fn run(&self) -> Result<SimulationResults, SimulationError> {
        let sim = TrajectorySimulator::from_config(self.config);
        let events = self.run_with(&sim)?;
        Ok(SimulationResults::new(self.config.clone(), events))
    }

    /// Simulate with any [`ParticleSimulator`] and concatenate the events in
    /// particle-index order.
    pub fn run_with<S: ParticleSimulator + ?Sized>(
        &self,
        sim: &S,
    ) -> Result<Vec<DecayEvent>, SimulationError> {
        let started = Instant::now();
        let trajectories = self.trajectories(sim)?;
        let decayed = trajectories.iter().filter(|t| !t.events.is_empty()).count();
        let events: Vec<DecayEvent> = trajectories.into_iter().flat_map(|t| t.events).collect();
        info!(
            particles = self.config.num_particles(),
            decayed,
            events = events.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "population simulated"
        );
        Ok(events)
    }

    /// One trajectory per particle, in particle-index order.
    ///
    /// Fails the whole batch on the first particle error, naming the
    /// particle.
    pub fn trajectories<S: ParticleSimulator + ?Sized>(
        &self,
        sim: &S,
    ) -> Result<Vec<Trajectory>, SimulationError> {
        let n = self.config.num_particles();
        let seed = self.config.seed();
        let completed = AtomicU64::new(0);
        info!(particles = n, seed, execution = %self.execution, "simulating population");

        let one = |particle: u64| -> Result<Trajectory, SimulationError> {
            if self.cancel.is_cancelled() {
                return Err(SimulationError::Cancelled {
                    completed: completed.load(Ordering::Relaxed),
                });
            }
            let mut rng = particle_rng(seed, particle);
            let trajectory = sim
                .simulate_particle(particle, &mut rng)
                .map_err(|source| SimulationError::Particle { particle, source })?;
            completed.fetch_add(1, Ordering::Relaxed);
            Ok(trajectory)
        };

        let result = match self.execution {
            Execution::Sequential => (0..n).map(&one).collect(),
            Execution::Parallel { threads: None } => (0..n).into_par_iter().map(&one).collect(),
            Execution::Parallel { threads: Some(threads) } => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| SimulationError::ThreadPool(e.to_string()))?;
                pool.install(|| (0..n).into_par_iter().map(&one).collect())
            }
        };
        debug!(completed = completed.load(Ordering::Relaxed), "particle loop finished");
        result
    }
}

/// Validate `config` and run it with the default execution.
pub fn simulate(config: &SimulationConfig) -> Result<SimulationResults, HalflifeError> {
    config.validate()?;
    Ok(PopulationSimulator::new(config).run()?)
}
