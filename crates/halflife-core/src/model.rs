//! Decay-chain graph model.
//!
//! A [`DecayChain`] is an arena of [`Isotope`]s addressed by index. Decay
//! channels point at their destination by index, never by reference, so a
//! chain may contain cycles without ownership cycles. Isotope 0 is the start
//! isotope of every simulated particle.
//!
//! Chains are built once through [`DecayChainBuilder`] and are read-only
//! afterwards.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::{LN_2, PROBABILITY_SCALE, PROBABILITY_SUM_TOLERANCE, START_ISOTOPE};
use crate::error::ChainError;
use crate::time::parse_duration;

/// Position of an isotope in its chain.
pub type IsotopeIndex = usize;

/// The two channel slots an isotope can populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecayMode {
    Alpha,
    Beta,
}

impl fmt::Display for DecayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alpha => f.write_str("alpha"),
            Self::Beta => f.write_str("beta"),
        }
    }
}

/// A possible transition out of an isotope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayChannel {
    rate: f64,
    probability: f64,
    to_isotope: IsotopeIndex,
    energy: f64,
}

impl DecayChannel {
    /// Create a channel from its rate constant (inverse mean lifetime, 1/s).
    ///
    /// `probability` is on the 0–100 scale, `energy` in MeV.
    pub fn new(
        rate: f64,
        probability: f64,
        to_isotope: IsotopeIndex,
        energy: f64,
    ) -> Result<Self, ChainError> {
        let channel = Self {
            rate,
            probability,
            to_isotope,
            energy,
        };
        channel.check()?;
        Ok(channel)
    }

    /// Create a channel from a half-life in seconds: `rate = ln 2 / half_life`.
    pub fn from_half_life(
        half_life: f64,
        probability: f64,
        to_isotope: IsotopeIndex,
        energy: f64,
    ) -> Result<Self, ChainError> {
        if !(half_life.is_finite() && half_life > 0.0) {
            return Err(ChainError::NonPositiveHalfLife(half_life));
        }
        Self::new(LN_2 / half_life, probability, to_isotope, energy)
    }

    fn check(&self) -> Result<(), ChainError> {
        if !(self.rate.is_finite() && self.rate > 0.0) {
            return Err(ChainError::NonPositiveRate(self.rate));
        }
        if !(0.0..=PROBABILITY_SCALE).contains(&self.probability) {
            return Err(ChainError::InvalidProbability(self.probability));
        }
        if !(self.energy.is_finite() && self.energy >= 0.0) {
            return Err(ChainError::InvalidEnergy(self.energy));
        }
        Ok(())
    }

    /// Rate constant λ in 1/s.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Branching probability on the 0–100 scale.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn to_isotope(&self) -> IsotopeIndex {
        self.to_isotope
    }

    /// Energy released by this decay, in MeV.
    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn half_life(&self) -> f64 {
        LN_2 / self.rate
    }

    pub fn mean_lifetime(&self) -> f64 {
        1.0 / self.rate
    }
}

/// The populated channel slots of an isotope.
///
/// A stable isotope is its own variant, so every consumer has to handle it
/// explicitly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecayChannels {
    #[default]
    Stable,
    Single {
        mode: DecayMode,
        channel: DecayChannel,
    },
    Dual {
        alpha: DecayChannel,
        beta: DecayChannel,
    },
}

impl DecayChannels {
    /// Install `channel` in the `mode` slot, returning the channel it replaced.
    pub fn set(&mut self, mode: DecayMode, channel: DecayChannel) -> Option<DecayChannel> {
        let (next, replaced) = match (std::mem::take(self), mode) {
            (Self::Stable, mode) => (Self::Single { mode, channel }, None),
            (Self::Single { mode: held, channel: old }, mode) if held == mode => {
                (Self::Single { mode, channel }, Some(old))
            }
            (Self::Single { channel: alpha, .. }, DecayMode::Beta) => {
                (Self::Dual { alpha, beta: channel }, None)
            }
            (Self::Single { channel: beta, .. }, DecayMode::Alpha) => {
                (Self::Dual { alpha: channel, beta }, None)
            }
            (Self::Dual { alpha, beta }, DecayMode::Alpha) => {
                (Self::Dual { alpha: channel, beta }, Some(alpha))
            }
            (Self::Dual { alpha, beta }, DecayMode::Beta) => {
                (Self::Dual { alpha, beta: channel }, Some(beta))
            }
        };
        *self = next;
        replaced
    }

    pub fn get(&self, mode: DecayMode) -> Option<&DecayChannel> {
        match (self, mode) {
            (Self::Single { mode: held, channel }, mode) if *held == mode => Some(channel),
            (Self::Dual { alpha, .. }, DecayMode::Alpha) => Some(alpha),
            (Self::Dual { beta, .. }, DecayMode::Beta) => Some(beta),
            _ => None,
        }
    }

    /// Populated slots in alpha-then-beta order.
    pub fn iter(&self) -> impl Iterator<Item = (DecayMode, &DecayChannel)> {
        let (first, second) = match self {
            Self::Stable => (None, None),
            Self::Single { mode, channel } => (Some((*mode, channel)), None),
            Self::Dual { alpha, beta } => (
                Some((DecayMode::Alpha, alpha)),
                Some((DecayMode::Beta, beta)),
            ),
        };
        first.into_iter().chain(second)
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Stable => 0,
            Self::Single { .. } => 1,
            Self::Dual { .. } => 2,
        }
    }

    pub fn is_stable(&self) -> bool {
        matches!(self, Self::Stable)
    }
}

/// A node of the decay chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Isotope {
    index: IsotopeIndex,
    name: String,
    #[serde(default)]
    channels: DecayChannels,
}

impl Isotope {
    pub fn index(&self) -> IsotopeIndex {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channels(&self) -> &DecayChannels {
        &self.channels
    }

    pub fn channel(&self, mode: DecayMode) -> Option<&DecayChannel> {
        self.channels.get(mode)
    }

    pub fn is_stable(&self) -> bool {
        self.channels.is_stable()
    }

    /// Sum of branching probabilities when both slots are populated.
    pub fn branching_sum(&self) -> Option<f64> {
        match &self.channels {
            DecayChannels::Dual { alpha, beta } => Some(alpha.probability() + beta.probability()),
            _ => None,
        }
    }

    fn is_balanced(&self) -> bool {
        self.branching_sum()
            .is_none_or(|sum| (sum - PROBABILITY_SCALE).abs() <= PROBABILITY_SUM_TOLERANCE)
    }
}

/// An immutable decay chain: isotopes indexed `0..len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayChain {
    isotopes: Vec<Isotope>,
}

impl DecayChain {
    /// The isotope at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range; channel destinations are validated
    /// when the chain is built, so this indicates a programming error.
    pub fn isotope(&self, index: IsotopeIndex) -> &Isotope {
        &self.isotopes[index]
    }

    pub fn get(&self, index: IsotopeIndex) -> Option<&Isotope> {
        self.isotopes.get(index)
    }

    /// The start isotope (index 0).
    pub fn start(&self) -> &Isotope {
        self.isotope(START_ISOTOPE)
    }

    pub fn isotopes(&self) -> &[Isotope] {
        &self.isotopes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Isotope> {
        self.isotopes.iter()
    }

    pub fn len(&self) -> usize {
        self.isotopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.isotopes.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<IsotopeIndex> {
        self.isotopes.iter().position(|iso| iso.name == name)
    }

    /// Two-channel isotopes whose probabilities do not sum to 100.
    pub fn branching_imbalances(&self) -> Vec<(IsotopeIndex, f64)> {
        self.isotopes
            .iter()
            .filter(|iso| !iso.is_balanced())
            .filter_map(|iso| iso.branching_sum().map(|sum| (iso.index, sum)))
            .collect()
    }

    /// Whether some isotope can decay back into itself through the chain.
    pub fn has_cycle(&self) -> bool {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            New,
            Open,
            Done,
        }

        let mut marks = vec![Mark::New; self.isotopes.len()];
        for root in 0..self.isotopes.len() {
            if marks[root] != Mark::New {
                continue;
            }
            // (node, next channel position to visit)
            let mut stack = vec![(root, 0usize)];
            marks[root] = Mark::Open;
            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                let target = self.isotopes[node]
                    .channels
                    .iter()
                    .nth(frame.1)
                    .map(|(_, ch)| ch.to_isotope);
                frame.1 += 1;
                match target {
                    Some(to) => match marks[to] {
                        Mark::Open => return true,
                        Mark::New => {
                            marks[to] = Mark::Open;
                            stack.push((to, 0));
                        }
                        Mark::Done => {}
                    },
                    None => {
                        marks[node] = Mark::Done;
                        stack.pop();
                    }
                }
            }
        }
        false
    }

    /// Re-check every structural invariant.
    ///
    /// Needed for chains that did not come out of [`DecayChainBuilder`],
    /// e.g. deserialized snapshots. Branching sums are checked only under
    /// [`BranchingPolicy::Strict`].
    pub fn validate(&self, policy: BranchingPolicy) -> Result<(), ChainError> {
        if self.isotopes.is_empty() {
            return Err(ChainError::EmptyChain);
        }
        let len = self.isotopes.len();
        for (position, iso) in self.isotopes.iter().enumerate() {
            if iso.index != position {
                return Err(ChainError::MisplacedIsotope {
                    index: iso.index,
                    position,
                });
            }
            if iso.name.is_empty() {
                return Err(ChainError::EmptyName);
            }
            for (mode, channel) in iso.channels.iter() {
                channel.check()?;
                if channel.to_isotope >= len {
                    return Err(ChainError::DanglingChannel {
                        isotope: iso.index,
                        mode,
                        to: channel.to_isotope,
                        len,
                    });
                }
            }
        }
        policy.apply(self)
    }
}

impl<'a> IntoIterator for &'a DecayChain {
    type Item = &'a Isotope;
    type IntoIter = std::slice::Iter<'a, Isotope>;

    fn into_iter(self) -> Self::IntoIter {
        self.isotopes.iter()
    }
}

/// What to do with two-channel isotopes whose probabilities do not sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchingPolicy {
    /// Reject the chain.
    #[default]
    Strict,
    /// Keep the chain and log a warning; the beta channel absorbs the
    /// remainder during selection.
    Permissive,
}

impl BranchingPolicy {
    fn apply(self, chain: &DecayChain) -> Result<(), ChainError> {
        for (index, sum) in chain.branching_imbalances() {
            let name = chain.isotope(index).name().to_string();
            match self {
                Self::Strict => return Err(ChainError::UnbalancedBranching { name, sum }),
                Self::Permissive => {
                    warn!(isotope = %name, sum, "branching probabilities do not sum to 100");
                }
            }
        }
        Ok(())
    }
}

/// Incremental construction of a [`DecayChain`].
///
/// Isotopes are created on first reference by name and numbered in
/// first-seen order, so the first `from` name becomes the start isotope.
#[derive(Debug, Default)]
pub struct DecayChainBuilder {
    isotopes: Vec<Isotope>,
    by_name: HashMap<String, IsotopeIndex>,
    policy: BranchingPolicy,
}

impl DecayChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn branching_policy(mut self, policy: BranchingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Index of `name`, inserting a stable isotope if it is new.
    pub fn ensure_isotope(&mut self, name: &str) -> Result<IsotopeIndex, ChainError> {
        if name.is_empty() {
            return Err(ChainError::EmptyName);
        }
        if let Some(&index) = self.by_name.get(name) {
            return Ok(index);
        }
        let index = self.isotopes.len();
        self.isotopes.push(Isotope {
            index,
            name: name.to_string(),
            channels: DecayChannels::Stable,
        });
        self.by_name.insert(name.to_string(), index);
        Ok(index)
    }

    /// Attach a decay `from → to` in the `mode` slot of `from`.
    ///
    /// A second decay for the same slot replaces the first.
    pub fn add_decay(
        &mut self,
        from: &str,
        to: &str,
        mode: DecayMode,
        probability: f64,
        half_life: f64,
        energy: f64,
    ) -> Result<&mut Self, ChainError> {
        if from.is_empty() || to.is_empty() {
            return Err(ChainError::EmptyName);
        }
        // a rejected decay must leave the arena untouched
        let mut channel = DecayChannel::from_half_life(half_life, probability, 0, energy)?;
        let from_index = self.ensure_isotope(from)?;
        channel.to_isotope = self.ensure_isotope(to)?;
        if self.isotopes[from_index].channels.set(mode, channel).is_some() {
            warn!(isotope = from, %mode, "duplicate decay channel, keeping the last one");
        }
        Ok(self)
    }

    pub fn add_spec(&mut self, spec: &DecaySpec) -> Result<&mut Self, ChainError> {
        let half_life = parse_duration(&spec.half_life)?;
        self.add_decay(
            &spec.from,
            &spec.to,
            spec.mode,
            spec.probability,
            half_life,
            spec.energy,
        )
    }

    pub fn build(self) -> Result<DecayChain, ChainError> {
        if self.isotopes.is_empty() {
            return Err(ChainError::EmptyChain);
        }
        let chain = DecayChain {
            isotopes: self.isotopes,
        };
        self.policy.apply(&chain)?;
        Ok(chain)
    }
}

/// One decay of a chain definition, as produced by a chain-file reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecaySpec {
    pub from: String,
    pub to: String,
    pub mode: DecayMode,
    /// 0–100.
    pub probability: f64,
    /// `"<number> <unit>"`, see [`crate::time::UNITS`].
    pub half_life: String,
    /// MeV.
    pub energy: f64,
}

/// A whole chain definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChainSpec {
    pub decays: Vec<DecaySpec>,
}

impl ChainSpec {
    pub fn build(&self, policy: BranchingPolicy) -> Result<DecayChain, ChainError> {
        let mut builder = DecayChainBuilder::new().branching_policy(policy);
        for spec in &self.decays {
            builder.add_spec(spec)?;
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thorium_x() -> DecayChain {
        let mut b = DecayChainBuilder::new();
        b.add_decay("Ra(228)", "Ac(228)", DecayMode::Beta, 100.0, 5.75 * 3.15e7, 0.046)
            .unwrap()
            .add_decay("Ac(228)", "Th(228)", DecayMode::Beta, 100.0, 6.15 * 3600.0, 2.124)
            .unwrap()
            .add_decay("Th(228)", "Ra(224)", DecayMode::Alpha, 100.0, 1.91 * 3.15e7, 5.520)
            .unwrap();
        b.build().unwrap()
    }

    fn channel(p: f64, to: usize) -> DecayChannel {
        DecayChannel::new(1.0, p, to, 1.0).unwrap()
    }

    // --- DecayChannel ---

    #[test]
    fn rate_from_half_life() {
        let ch = DecayChannel::from_half_life(2.0, 100.0, 1, 5.0).unwrap();
        assert_eq!(ch.rate(), LN_2 / 2.0);
        assert!((ch.half_life() - 2.0).abs() < 1e-12);
        assert!((ch.mean_lifetime() - 2.0 / LN_2).abs() < 1e-12);
    }

    #[test]
    fn non_positive_half_life_rejected() {
        assert_eq!(
            DecayChannel::from_half_life(0.0, 100.0, 1, 1.0),
            Err(ChainError::NonPositiveHalfLife(0.0))
        );
        assert!(DecayChannel::from_half_life(-1.0, 100.0, 1, 1.0).is_err());
        assert!(DecayChannel::from_half_life(f64::NAN, 100.0, 1, 1.0).is_err());
    }

    #[test]
    fn zero_rate_rejected() {
        assert_eq!(
            DecayChannel::new(0.0, 100.0, 1, 1.0),
            Err(ChainError::NonPositiveRate(0.0))
        );
        assert!(DecayChannel::new(f64::INFINITY, 100.0, 1, 1.0).is_err());
    }

    #[test]
    fn probability_and_energy_bounds() {
        assert!(DecayChannel::new(1.0, 100.5, 1, 1.0).is_err());
        assert!(DecayChannel::new(1.0, -0.1, 1, 1.0).is_err());
        assert!(DecayChannel::new(1.0, 0.0, 1, 0.0).is_ok());
        assert_eq!(
            DecayChannel::new(1.0, 50.0, 1, -2.0),
            Err(ChainError::InvalidEnergy(-2.0))
        );
    }

    // --- DecayChannels ---

    #[test]
    fn slots_fill_in_any_order() {
        let mut c = DecayChannels::default();
        assert!(c.is_stable());
        assert!(c.set(DecayMode::Beta, channel(70.0, 2)).is_none());
        assert_eq!(c.len(), 1);
        assert!(c.set(DecayMode::Alpha, channel(30.0, 1)).is_none());
        match &c {
            DecayChannels::Dual { alpha, beta } => {
                assert_eq!(alpha.to_isotope(), 1);
                assert_eq!(beta.to_isotope(), 2);
            }
            other => panic!("expected dual, got {other:?}"),
        }
    }

    #[test]
    fn last_write_wins_per_slot() {
        let mut c = DecayChannels::default();
        c.set(DecayMode::Alpha, channel(100.0, 1));
        let replaced = c.set(DecayMode::Alpha, channel(100.0, 3)).unwrap();
        assert_eq!(replaced.to_isotope(), 1);
        assert_eq!(c.get(DecayMode::Alpha).unwrap().to_isotope(), 3);
        assert!(c.get(DecayMode::Beta).is_none());

        c.set(DecayMode::Beta, channel(0.0, 4));
        let replaced = c.set(DecayMode::Beta, channel(0.0, 5)).unwrap();
        assert_eq!(replaced.to_isotope(), 4);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn iter_is_alpha_then_beta() {
        let mut c = DecayChannels::default();
        c.set(DecayMode::Beta, channel(50.0, 2));
        c.set(DecayMode::Alpha, channel(50.0, 1));
        let modes: Vec<_> = c.iter().map(|(m, _)| m).collect();
        assert_eq!(modes, vec![DecayMode::Alpha, DecayMode::Beta]);
    }

    // --- builder ---

    #[test]
    fn indices_follow_first_reference() {
        let chain = thorium_x();
        let names: Vec<_> = chain.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["Ra(228)", "Ac(228)", "Th(228)", "Ra(224)"]);
        assert_eq!(chain.start().name(), "Ra(228)");
        assert_eq!(chain.index_of("Th(228)"), Some(2));
        assert_eq!(chain.index_of("U(238)"), None);
        assert!(chain.isotope(3).is_stable());
    }

    #[test]
    fn empty_builder_fails() {
        assert_eq!(DecayChainBuilder::new().build(), Err(ChainError::EmptyChain));
    }

    #[test]
    fn empty_name_rejected() {
        let mut b = DecayChainBuilder::new();
        assert_eq!(
            b.add_decay("", "B", DecayMode::Alpha, 100.0, 1.0, 1.0).err(),
            Some(ChainError::EmptyName)
        );
    }

    #[test]
    fn rejected_decay_adds_no_isotopes() {
        let mut b = DecayChainBuilder::new();
        b.add_decay("A", "B", DecayMode::Alpha, 100.0, 1.0, 1.0).unwrap();
        assert_eq!(
            b.add_decay("C", "D", DecayMode::Alpha, 100.0, -1.0, 1.0).err(),
            Some(ChainError::NonPositiveHalfLife(-1.0))
        );
        assert!(b.add_decay("C", "D", DecayMode::Beta, 150.0, 1.0, 1.0).is_err());
        assert!(b.add_decay("C", "D", DecayMode::Beta, 50.0, 1.0, f64::NAN).is_err());
        assert!(b.add_decay("C", "", DecayMode::Beta, 50.0, 1.0, 1.0).is_err());
        let chain = b.build().unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.index_of("C"), None);
        assert_eq!(chain.index_of("D"), None);
    }

    #[test]
    fn strict_policy_rejects_unbalanced_branching() {
        let mut b = DecayChainBuilder::new();
        b.add_decay("A", "B", DecayMode::Alpha, 30.0, 1.0, 1.0).unwrap();
        b.add_decay("A", "C", DecayMode::Beta, 60.0, 1.0, 1.0).unwrap();
        match b.build() {
            Err(ChainError::UnbalancedBranching { name, sum }) => {
                assert_eq!(name, "A");
                assert_eq!(sum, 90.0);
            }
            other => panic!("expected imbalance error, got {other:?}"),
        }
    }

    #[test]
    fn permissive_policy_keeps_unbalanced_branching() {
        let mut b = DecayChainBuilder::new().branching_policy(BranchingPolicy::Permissive);
        b.add_decay("A", "B", DecayMode::Alpha, 30.0, 1.0, 1.0).unwrap();
        b.add_decay("A", "C", DecayMode::Beta, 60.0, 1.0, 1.0).unwrap();
        let chain = b.build().unwrap();
        assert_eq!(chain.branching_imbalances(), vec![(0, 90.0)]);
    }

    #[test]
    fn single_channel_probability_is_not_checked() {
        let mut b = DecayChainBuilder::new();
        b.add_decay("A", "B", DecayMode::Alpha, 42.0, 1.0, 1.0).unwrap();
        assert!(b.build().is_ok());
    }

    #[test]
    fn spec_with_bad_unit_fails() {
        let spec = ChainSpec {
            decays: vec![DecaySpec {
                from: "A".into(),
                to: "B".into(),
                mode: DecayMode::Alpha,
                probability: 100.0,
                half_life: "3 fortnights".into(),
                energy: 1.0,
            }],
        };
        assert_eq!(
            spec.build(BranchingPolicy::Strict),
            Err(ChainError::UnknownTimeUnit("fortnights".into()))
        );
    }

    #[test]
    fn spec_builds_chain() {
        let json = r#"{"decays": [
            {"from": "Bi(212)", "to": "Tl(208)", "mode": "alpha", "probability": 35.94, "half_life": "60.55 min", "energy": 6.207},
            {"from": "Bi(212)", "to": "Po(212)", "mode": "beta", "probability": 64.06, "half_life": "60.55 min", "energy": 2.252}
        ]}"#;
        let spec: ChainSpec = serde_json::from_str(json).unwrap();
        let chain = spec.build(BranchingPolicy::Strict).unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.start().channels().len(), 2);
        let alpha = chain.start().channel(DecayMode::Alpha).unwrap();
        assert!((alpha.half_life() - 60.55 * 60.0).abs() < 1e-9);
    }

    // --- chain queries ---

    #[test]
    fn linear_chain_has_no_cycle() {
        assert!(!thorium_x().has_cycle());
    }

    #[test]
    fn self_loop_and_back_edge_are_cycles() {
        let mut b = DecayChainBuilder::new();
        b.add_decay("A", "A", DecayMode::Alpha, 100.0, 1.0, 1.0).unwrap();
        assert!(b.build().unwrap().has_cycle());

        let mut b = DecayChainBuilder::new();
        b.add_decay("A", "B", DecayMode::Alpha, 100.0, 1.0, 1.0).unwrap();
        b.add_decay("B", "C", DecayMode::Beta, 100.0, 1.0, 1.0).unwrap();
        b.add_decay("C", "A", DecayMode::Beta, 100.0, 1.0, 1.0).unwrap();
        assert!(b.build().unwrap().has_cycle());
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let mut b = DecayChainBuilder::new();
        b.add_decay("A", "B", DecayMode::Alpha, 50.0, 1.0, 1.0).unwrap();
        b.add_decay("A", "C", DecayMode::Beta, 50.0, 1.0, 1.0).unwrap();
        b.add_decay("B", "D", DecayMode::Beta, 100.0, 1.0, 1.0).unwrap();
        b.add_decay("C", "D", DecayMode::Alpha, 100.0, 1.0, 1.0).unwrap();
        assert!(!b.build().unwrap().has_cycle());
    }

    #[test]
    #[should_panic]
    fn out_of_range_index_panics() {
        thorium_x().isotope(17);
    }

    #[test]
    fn validate_accepts_built_chain() {
        assert!(thorium_x().validate(BranchingPolicy::Strict).is_ok());
    }

    #[test]
    fn validate_catches_dangling_channel() {
        let json = r#"{"isotopes": [
            {"index": 0, "name": "A", "channels": {"kind": "single", "mode": "alpha",
              "channel": {"rate": 1.0, "probability": 100.0, "to_isotope": 5, "energy": 1.0}}}
        ]}"#;
        let chain: DecayChain = serde_json::from_str(json).unwrap();
        assert_eq!(
            chain.validate(BranchingPolicy::Strict),
            Err(ChainError::DanglingChannel {
                isotope: 0,
                mode: DecayMode::Alpha,
                to: 5,
                len: 1
            })
        );
    }

    #[test]
    fn validate_catches_zero_rate_and_misplaced_index() {
        let json = r#"{"isotopes": [
            {"index": 0, "name": "A", "channels": {"kind": "single", "mode": "beta",
              "channel": {"rate": 0.0, "probability": 100.0, "to_isotope": 0, "energy": 1.0}}}
        ]}"#;
        let chain: DecayChain = serde_json::from_str(json).unwrap();
        assert_eq!(
            chain.validate(BranchingPolicy::Strict),
            Err(ChainError::NonPositiveRate(0.0))
        );

        let json = r#"{"isotopes": [{"index": 3, "name": "A"}]}"#;
        let chain: DecayChain = serde_json::from_str(json).unwrap();
        assert!(matches!(
            chain.validate(BranchingPolicy::Strict),
            Err(ChainError::MisplacedIsotope { index: 3, position: 0 })
        ));
    }

    #[test]
    fn serde_round_trip_preserves_chain() {
        let chain = thorium_x();
        let json = serde_json::to_string(&chain).unwrap();
        let back: DecayChain = serde_json::from_str(&json).unwrap();
        assert_eq!(back, chain);
    }
}
