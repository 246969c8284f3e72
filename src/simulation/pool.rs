//! Global resource pool - the sum of every claim stake's ledger
//!
//! The pool is derived state. It is recomputed in full after every tick
//! and after every committed command; nothing trusts incremental deltas.

use ahash::AHashMap;

use crate::core::types::ResourceId;
use crate::stake::claim::ClaimStake;

/// Sum all stake ledgers into one pool
pub fn recompute_pool<'a>(
    stakes: impl Iterator<Item = &'a ClaimStake>,
) -> AHashMap<ResourceId, f32> {
    let mut pool: AHashMap<ResourceId, f32> = AHashMap::new();
    for stake in stakes {
        for (resource, amount) in stake.ledger.iter() {
            *pool.entry(resource).or_insert(0.0) += amount;
        }
    }
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::core::types::Tier;
    use ahash::AHashSet;

    #[test]
    fn test_pool_sums_across_stakes() {
        let catalog = Catalog::with_defaults();
        let planet = catalog.planet_by_key("terrestrial").unwrap().id;
        let steel = catalog.resource_by_name("steel").unwrap();
        let fuel = catalog.resource_by_name("fuel").unwrap();

        let mut a = ClaimStake::new(Tier::T1, planet, AHashSet::new());
        a.ledger.credit(steel, 40.0);
        a.ledger.credit(fuel, 5.0);

        let mut b = ClaimStake::new(Tier::T1, planet, AHashSet::new());
        b.ledger.credit(steel, 60.0);

        let pool = recompute_pool([&a, &b].into_iter());
        assert!((pool[&steel] - 100.0).abs() < 0.001);
        assert!((pool[&fuel] - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_empty_pool() {
        let pool = recompute_pool(std::iter::empty());
        assert!(pool.is_empty());
    }
}
