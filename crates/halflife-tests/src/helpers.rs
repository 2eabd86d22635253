//! Shared chain fixtures and run helpers.

use halflife_core::model::{BranchingPolicy, DecayChain, DecayChainBuilder, DecayMode};
use halflife_core::{SimulationConfig, SimulationResults};
use halflife_io::analysis::IsotopeSeries;
use halflife_sim::{Execution, PopulationSimulator};

/// `Parent → Daughter`, alpha, 100 %, 5 MeV.
pub fn two_member(half_life: f64) -> DecayChain {
    let mut b = DecayChainBuilder::new();
    b.add_decay("Parent", "Daughter", DecayMode::Alpha, 100.0, half_life, 5.0)
        .unwrap();
    b.build().unwrap()
}

/// `Parent → Alpha` with `alpha_pct` %, `Parent → Beta` with the rest.
pub fn branching(alpha_pct: f64, half_life: f64) -> DecayChain {
    let mut b = DecayChainBuilder::new();
    b.add_decay("Parent", "Alpha", DecayMode::Alpha, alpha_pct, half_life, 4.0)
        .unwrap();
    b.add_decay("Parent", "Beta", DecayMode::Beta, 100.0 - alpha_pct, half_life, 1.0)
        .unwrap();
    b.build().unwrap()
}

/// `Parent → Daughter → Granddaughter`.
pub fn three_member(parent_half_life: f64, daughter_half_life: f64) -> DecayChain {
    let mut b = DecayChainBuilder::new();
    b.add_decay("Parent", "Daughter", DecayMode::Alpha, 100.0, parent_half_life, 4.0)
        .unwrap()
        .add_decay(
            "Daughter",
            "Granddaughter",
            DecayMode::Beta,
            100.0,
            daughter_half_life,
            1.0,
        )
        .unwrap();
    b.build().unwrap()
}

/// The thorium series from radium-228 to lead-208, half-lives in seconds.
pub fn thorium_series() -> DecayChain {
    const YEAR: f64 = 365.0 * 24.0 * 3600.0;
    let mut b = DecayChainBuilder::new().branching_policy(BranchingPolicy::Strict);
    b.add_decay("Ra(228)", "Ac(228)", DecayMode::Beta, 100.0, 5.75 * YEAR, 0.046).unwrap();
    b.add_decay("Ac(228)", "Th(228)", DecayMode::Beta, 100.0, 6.15 * 3600.0, 2.124).unwrap();
    b.add_decay("Th(228)", "Ra(224)", DecayMode::Alpha, 100.0, 1.9116 * YEAR, 5.520).unwrap();
    b.add_decay("Ra(224)", "Rn(220)", DecayMode::Alpha, 100.0, 3.6319 * 86400.0, 5.789).unwrap();
    b.add_decay("Rn(220)", "Po(216)", DecayMode::Alpha, 100.0, 55.6, 6.404).unwrap();
    b.add_decay("Po(216)", "Pb(212)", DecayMode::Alpha, 100.0, 0.145, 6.906).unwrap();
    b.add_decay("Pb(212)", "Bi(212)", DecayMode::Beta, 100.0, 10.64 * 3600.0, 0.570).unwrap();
    b.add_decay("Bi(212)", "Po(212)", DecayMode::Beta, 64.06, 60.55 * 60.0, 2.252).unwrap();
    b.add_decay("Bi(212)", "Tl(208)", DecayMode::Alpha, 35.94, 60.55 * 60.0, 6.208).unwrap();
    b.add_decay("Po(212)", "Pb(208)", DecayMode::Alpha, 100.0, 299e-9, 8.955).unwrap();
    b.add_decay("Tl(208)", "Pb(208)", DecayMode::Beta, 100.0, 3.053 * 60.0, 4.999).unwrap();
    b.build().unwrap()
}

pub fn config(chain: DecayChain, particles: u64, horizon: f64, seed: u64) -> SimulationConfig {
    SimulationConfig::new(chain, particles, horizon, "halflife-test")
        .unwrap()
        .with_seed(seed)
}

/// Run on the global rayon pool.
pub fn run(config: &SimulationConfig) -> SimulationResults {
    run_with(config, Execution::default())
}

pub fn run_with(config: &SimulationConfig, execution: Execution) -> SimulationResults {
    PopulationSimulator::new(config)
        .execution(execution)
        .run()
        .unwrap()
}

/// Value of a step series at time `t`.
pub fn value_at(series: &IsotopeSeries, t: f64) -> f64 {
    series
        .points
        .iter()
        .take_while(|p| p.time <= t)
        .last()
        .map_or(0.0, |p| p.value)
}

/// `|actual − expected| ≤ tolerance · expected`.
pub fn assert_close(actual: f64, expected: f64, tolerance: f64, what: &str) {
    let err = (actual - expected).abs();
    assert!(
        err <= tolerance * expected.abs(),
        "{what}: got {actual}, expected {expected} ± {:.1}%",
        tolerance * 100.0
    );
}
