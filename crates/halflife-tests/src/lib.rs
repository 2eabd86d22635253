//! Statistical and end-to-end test suite for Halflife.
//!
//! Runs whole populations through small chains and checks the outcome
//! against the analytic decay law, the configured branching ratios and the
//! file round trip. Every run is seeded, so results are deterministic.

pub mod helpers;
