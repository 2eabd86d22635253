//! Model constants.

/// Branching probabilities are expressed on a 0–100 scale.
pub const PROBABILITY_SCALE: f64 = 100.0;

/// Allowed deviation of a two-channel isotope's probability sum from
/// [`PROBABILITY_SCALE`].
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// `ln 2`, relating a half-life to its rate constant: `rate = LN_2 / half_life`.
pub const LN_2: f64 = std::f64::consts::LN_2;

/// Index of the isotope every simulated particle starts from.
pub const START_ISOTOPE: usize = 0;

/// Seconds in a year for the `a` time unit (365 days, no leap correction).
pub const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 3600.0;
