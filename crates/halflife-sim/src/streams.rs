//! Independent random streams, one per particle.
//!
//! Every particle's generator is seeded from `(master_seed, particle)` alone,
//! so a run produces the same events whether particles are simulated in
//! order, on a thread pool, or one at a time for debugging.

use rand::rngs::StdRng;
use rand::SeedableRng;

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// SplitMix64 finalizer over `master_seed ^ particle * γ`.
///
/// Neighbouring particle indices map to uncorrelated seeds.
pub fn particle_seed(master_seed: u64, particle: u64) -> u64 {
    let mut z = master_seed ^ particle.wrapping_mul(GOLDEN_GAMMA);
    z = z.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// The generator for `particle` within a run seeded with `master_seed`.
pub fn particle_rng(master_seed: u64, particle: u64) -> StdRng {
    StdRng::seed_from_u64(particle_seed(master_seed, particle))
}
