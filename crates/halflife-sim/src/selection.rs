//! Choosing which decay channel of an isotope fires.
//!
//! When both slots are populated one value is drawn uniformly from
//! `[0, 100)`; alpha wins if the draw is below its probability, otherwise
//! beta fires. If the two probabilities do not sum to 100 the beta branch
//! absorbs the remainder. Chains built under the strict branching policy
//! never reach that case.

use halflife_core::constants::PROBABILITY_SCALE;
use halflife_core::model::{DecayChannel, DecayChannels, DecayMode, Isotope};
use rand::Rng;

/// Pick the channel that fires next, or `None` for a stable isotope.
///
/// Consumes exactly one random draw for two-channel isotopes and none
/// otherwise.
pub fn select_channel<'a, R: Rng + ?Sized>(
    isotope: &'a Isotope,
    rng: &mut R,
) -> Option<(DecayMode, &'a DecayChannel)> {
    match isotope.channels() {
        DecayChannels::Stable => None,
        DecayChannels::Single { mode, channel } => Some((*mode, channel)),
        DecayChannels::Dual { alpha, beta } => {
            let draw: f64 = rng.gen_range(0.0..PROBABILITY_SCALE);
            if draw < alpha.probability() {
                Some((DecayMode::Alpha, alpha))
            } else {
                Some((DecayMode::Beta, beta))
            }
        }
    }
}
