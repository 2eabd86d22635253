//! Per-particle trajectory simulation implementing [`ParticleSimulator`].
//!
//! A particle starts on isotope 0 at `t = 0`. Each step selects a channel,
//! samples the waiting time from an exponential distribution with the
//! channel's rate and either records the decay or stops:
//!
//! - no channel: stop with [`StopReason::ReachedStableIsotope`]
//! - `t + wait > total_time`: stop with [`StopReason::ExceededTimeHorizon`],
//!   the pending decay is discarded

use halflife_core::constants::START_ISOTOPE;
use halflife_core::error::TrajectoryError;
use halflife_core::event::{DecayEvent, StopReason, Trajectory};
use halflife_core::model::{DecayChain, DecayChannel, IsotopeIndex};
use halflife_core::traits::ParticleSimulator;
use halflife_core::SimulationConfig;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, Exp};

use crate::selection::select_channel;

/// Simulates single particles over a borrowed, immutable chain.
#[derive(Debug, Clone, Copy)]
pub struct TrajectorySimulator<'a> {
    chain: &'a DecayChain,
    total_time: f64,
}

impl<'a> TrajectorySimulator<'a> {
    /// `total_time` is assumed positive; [`SimulationConfig`] guarantees it.
    pub fn new(chain: &'a DecayChain, total_time: f64) -> Self {
        Self { chain, total_time }
    }

    pub fn from_config(config: &'a SimulationConfig) -> Self {
        Self::new(config.decay_chain(), config.total_time())
    }

    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Run one particle to completion.
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        particle: u64,
        rng: &mut R,
    ) -> Result<Trajectory, TrajectoryError> {
        let mut events = Vec::new();
        let mut t = 0.0;
        let mut current = START_ISOTOPE;

        let stop = loop {
            let isotope = self.chain.isotope(current);
            let Some((_, channel)) = select_channel(isotope, rng) else {
                break StopReason::ReachedStableIsotope;
            };
            let decay_time = advance(t, waiting_time(current, channel, rng)?);
            if decay_time > self.total_time {
                break StopReason::ExceededTimeHorizon;
            }
            events.push(DecayEvent {
                particle,
                from_isotope: current,
                to_isotope: channel.to_isotope(),
                time: decay_time,
                energy: channel.energy(),
            });
            t = decay_time;
            current = channel.to_isotope();
        };

        Ok(Trajectory {
            particle,
            events,
            stop,
        })
    }
}

impl ParticleSimulator for TrajectorySimulator<'_> {
    fn simulate_particle(
        &self,
        particle: u64,
        rng: &mut dyn RngCore,
    ) -> Result<Trajectory, TrajectoryError> {
        self.simulate(particle, rng)
    }
}

/// `t + wait`, bumped to the next representable value when `wait` is too
/// small to move `t`. Keeps event times strictly increasing for
/// nanosecond-scale half-lives late in a long horizon. `t` is never negative.
pub fn advance(t: f64, wait: f64) -> f64 {
    let next = t + wait;
    if next > t {
        next
    } else {
        f64::from_bits(t.to_bits() + 1)
    }
}

/// Sample the time until `channel` fires, in seconds.
///
/// Rejects rates for which the exponential distribution is undefined instead
/// of letting infinities or NaNs into the event stream.
pub fn waiting_time<R: Rng + ?Sized>(
    isotope: IsotopeIndex,
    channel: &DecayChannel,
    rng: &mut R,
) -> Result<f64, TrajectoryError> {
    let rate = channel.rate();
    if !(rate.is_finite() && rate > 0.0) {
        return Err(TrajectoryError::InvalidRate { isotope, rate });
    }
    let exp = Exp::new(rate).map_err(|_| TrajectoryError::InvalidRate { isotope, rate })?;
    let value = exp.sample(rng);
    if !value.is_finite() {
        return Err(TrajectoryError::NonFiniteWaitingTime { isotope, value });
    }
    Ok(value)
}
