//! Stake-weighted validator election.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::Address;

/// Default stake granted to a newly registered peer.
pub const DEFAULT_PEER_STAKE: u64 = 50;

/// Initial stake of the local node on a fresh chain.
pub const INITIAL_SELF_STAKE: u64 = 100;

/// Mapping from validator identifier to non-negative stake weight.
///
/// Backed by a `BTreeMap` so iteration order — and therefore the cumulative
/// weight layout used by election — is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StakeRegistry {
    stakes: BTreeMap<Address, u64>,
}

impl StakeRegistry {
    pub fn get(&self, addr: &str) -> Option<u64> {
        self.stakes.get(addr).copied()
    }

    pub fn set(&mut self, addr: impl Into<Address>, weight: u64) {
        self.stakes.insert(addr.into(), weight);
    }

    /// Inserts `weight` only if `addr` has no stake yet. Returns true when
    /// the entry was created.
    pub fn ensure(&mut self, addr: &str, weight: u64) -> bool {
        if self.stakes.contains_key(addr) {
            return false;
        }
        self.stakes.insert(addr.to_string(), weight);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, u64)> {
        self.stakes.iter().map(|(a, w)| (a, *w))
    }

    pub fn is_empty(&self) -> bool {
        self.stakes.is_empty()
    }

    /// Picks a validator with probability proportional to its weight, or
    /// `None` when no positive stake exists.
    ///
    /// Inverse-CDF sampling over the cumulative positive weights: O(n) to
    /// build the prefix sums, O(log n) for the draw.
    pub fn select_validator<R: Rng>(&self, rng: &mut R) -> Option<&Address> {
        let mut cumulative: Vec<(u64, &Address)> = Vec::new();
        let mut total: u64 = 0;
        for (addr, weight) in &self.stakes {
            if *weight == 0 {
                continue;
            }
            total += weight;
            cumulative.push((total, addr));
        }
        if total == 0 {
            warn!("no validators with positive stake");
            return None;
        }
        let target = rng.gen_range(0..total);
        let idx = cumulative.partition_point(|(bound, _)| *bound <= target);
        cumulative.get(idx).map(|(_, addr)| *addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn empty_registry_elects_nobody() {
        let registry = StakeRegistry::default();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(registry.select_validator(&mut rng).is_none());
    }

    #[test]
    fn zero_weights_elect_nobody() {
        let mut registry = StakeRegistry::default();
        registry.set("node1", 0);
        registry.set("node2", 0);
        let mut rng = StdRng::seed_from_u64(7);
        assert!(registry.select_validator(&mut rng).is_none());
    }

    #[test]
    fn single_staker_always_wins() {
        let mut registry = StakeRegistry::default();
        registry.set("node1", 100);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            assert_eq!(registry.select_validator(&mut rng).map(String::as_str), Some("node1"));
        }
    }

    #[test]
    fn election_is_weight_proportional() {
        let mut registry = StakeRegistry::default();
        registry.set("light", 10);
        registry.set("heavy", 90);
        registry.set("broke", 0);

        let mut rng = StdRng::seed_from_u64(42);
        let mut heavy = 0;
        let mut light = 0;
        for _ in 0..1000 {
            match registry.select_validator(&mut rng).map(String::as_str) {
                Some("heavy") => heavy += 1,
                Some("light") => light += 1,
                other => panic!("unexpected winner: {other:?}"),
            }
        }
        assert!(light > 0);
        // Roughly 9:1; generous tolerance keeps the test deterministic-safe.
        assert!(heavy > light * 5, "heavy={heavy} light={light}");
        assert_eq!(heavy + light, 1000);
    }

    #[test]
    fn ensure_does_not_overwrite() {
        let mut registry = StakeRegistry::default();
        assert!(registry.ensure("a", 50));
        assert!(!registry.ensure("a", 999));
        assert_eq!(registry.get("a"), Some(50));
    }
}
