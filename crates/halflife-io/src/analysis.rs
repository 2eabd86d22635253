//! Post-processing of a finished run: per-isotope populations, released
//! energy and a summary table.
//!
//! All series are step functions over the globally time-sorted event
//! stream. Every particle starts on isotope 0 at `t = 0`.

use std::cmp::Ordering;

use halflife_core::constants::START_ISOTOPE;
use halflife_core::model::IsotopeIndex;
use halflife_core::SimulationResults;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub time: f64,
    pub value: f64,
}

/// A step series for one isotope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IsotopeSeries {
    pub isotope: IsotopeIndex,
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

/// Per-isotope totals over the whole run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IsotopeSummary {
    pub isotope: IsotopeIndex,
    pub name: String,
    /// Decays out of this isotope.
    pub decays: u64,
    /// Decays into this isotope.
    pub arrivals: u64,
    /// Particles on this isotope at the horizon.
    pub final_population: u64,
    /// MeV released by decays out of this isotope.
    pub energy: f64,
}

fn by_time(a: &f64, b: &f64) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Sort deltas by time and accumulate them onto `initial`.
fn cumulate(initial: f64, mut deltas: Vec<(f64, f64)>) -> Vec<SeriesPoint> {
    deltas.sort_by(|a, b| by_time(&a.0, &b.0));
    let mut points = Vec::with_capacity(deltas.len() + 1);
    points.push(SeriesPoint { time: 0.0, value: initial });
    let mut value = initial;
    for (time, delta) in deltas {
        value += delta;
        points.push(SeriesPoint { time, value });
    }
    points
}

fn series(
    results: &SimulationResults,
    initial: impl Fn(IsotopeIndex) -> f64,
    deltas: Vec<Vec<(f64, f64)>>,
) -> Vec<IsotopeSeries> {
    results
        .config()
        .decay_chain()
        .iter()
        .zip(deltas)
        .map(|(isotope, d)| IsotopeSeries {
            isotope: isotope.index(),
            name: isotope.name().to_string(),
            points: cumulate(initial(isotope.index()), d),
        })
        .collect()
}

/// Number of particles on each isotope over time.
///
/// Isotope 0 starts at the particle count, every other isotope at zero.
/// Each event moves one particle from its source to its destination.
pub fn population_series(results: &SimulationResults) -> Vec<IsotopeSeries> {
    let len = results.config().decay_chain().len();
    let n = results.config().num_particles() as f64;
    let mut deltas = vec![Vec::new(); len];
    for e in results.events() {
        deltas[e.from_isotope].push((e.time, -1.0));
        deltas[e.to_isotope].push((e.time, 1.0));
    }
    series(results, |i| if i == START_ISOTOPE { n } else { 0.0 }, deltas)
}

/// Which isotopes a decay's energy is credited to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnergyAttribution {
    /// Only the decaying isotope. Per-isotope totals sum to the run total.
    #[default]
    Source,
    /// Both the decaying isotope and its daughter, as the legacy released-energy
    /// plot did. Every decay is counted twice across the chain.
    SourceAndDestination,
}

/// Cumulative energy released by decays out of each isotope.
///
/// Unlike the legacy released-energy plot, a decay is not also credited to
/// its daughter; use [`energy_series_by`] with
/// [`EnergyAttribution::SourceAndDestination`] to reproduce those numbers.
pub fn energy_series(results: &SimulationResults) -> Vec<IsotopeSeries> {
    energy_series_by(results, EnergyAttribution::Source)
}

pub fn energy_series_by(
    results: &SimulationResults,
    attribution: EnergyAttribution,
) -> Vec<IsotopeSeries> {
    let len = results.config().decay_chain().len();
    let mut deltas = vec![Vec::new(); len];
    for e in results.events() {
        deltas[e.from_isotope].push((e.time, e.energy));
        if attribution == EnergyAttribution::SourceAndDestination {
            deltas[e.to_isotope].push((e.time, e.energy));
        }
    }
    series(results, |_| 0.0, deltas)
}

pub fn summarize(results: &SimulationResults) -> Vec<IsotopeSummary> {
    let chain = results.config().decay_chain();
    let mut rows: Vec<IsotopeSummary> = chain
        .iter()
        .map(|isotope| IsotopeSummary {
            isotope: isotope.index(),
            name: isotope.name().to_string(),
            decays: 0,
            arrivals: 0,
            final_population: 0,
            energy: 0.0,
        })
        .collect();

    for e in results.events() {
        rows[e.from_isotope].decays += 1;
        rows[e.from_isotope].energy += e.energy;
        rows[e.to_isotope].arrivals += 1;
    }
    for row in &mut rows {
        let initial = if row.isotope == START_ISOTOPE {
            results.config().num_particles()
        } else {
            0
        };
        row.final_population = (initial + row.arrivals).saturating_sub(row.decays);
    }
    rows
}

/// Expected daughter population of a parent → daughter → … chain at time
/// `t`, starting from `n0` parents and no daughters.
///
/// Falls back to the degenerate form `n0·λ·t·e^(−λt)` when both rates agree.
pub fn bateman_daughter(n0: f64, lambda_parent: f64, lambda_daughter: f64, t: f64) -> f64 {
    let diff = lambda_daughter - lambda_parent;
    if diff.abs() <= 1e-12 * lambda_parent.abs().max(lambda_daughter.abs()) {
        return n0 * lambda_parent * t * (-lambda_parent * t).exp();
    }
    n0 * lambda_parent / diff * ((-lambda_parent * t).exp() - (-lambda_daughter * t).exp())
}
