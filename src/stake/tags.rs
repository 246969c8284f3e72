//! Tag closure resolution
//!
//! Unlock tags gate construction. A stake's unlocked set is its base tags
//! (planet identity plus anything granted at creation) unioned with the
//! tags granted by every built instance. Construction is gated on this
//! set and nothing else.
//!
//! The advisory variant answers a weaker question for UI surfaces: could
//! this tag ever join the set, assuming every reachable building gets
//! built? That is a fixpoint over the catalog - any definition whose
//! requirements are already reachable and whose tier gate admits the
//! stake contributes its added tags, repeated until no growth. Tags are
//! only ever added from a finite universe, so the fixpoint terminates.
//! The advisory answer never gates anything.

use ahash::AHashSet;

use crate::catalog::{BuildingDefinition, Catalog};
use crate::core::types::{TagId, Tier};
use crate::stake::claim::ClaimStake;

/// The stake's current unlocked-tag set: base tags, planet tags, and the
/// added tags of every built instance
pub fn unlocked_closure(stake: &ClaimStake, catalog: &Catalog) -> AHashSet<TagId> {
    let mut set = stake.base_tags.clone();
    set.extend(catalog.planet(stake.planet).tags.iter().copied());
    for instance in &stake.instances {
        set.extend(
            catalog
                .building(instance.definition)
                .added_tags
                .iter()
                .copied(),
        );
    }
    set
}

/// Whether the given tag could ever join the stake's unlocked set through
/// some sequence of builds. Advisory only.
pub fn eventually_unlockable(stake: &ClaimStake, catalog: &Catalog, tag: TagId) -> bool {
    reachable_tags(stake, catalog).contains(&tag)
}

/// Whether the definition's tag requirements could ever be met on this
/// stake (its tier gate must still admit the stake today). Advisory only.
pub fn eventually_constructible(
    stake: &ClaimStake,
    catalog: &Catalog,
    def: &BuildingDefinition,
) -> bool {
    if !def.admits_stake_tier(stake.tier) {
        return false;
    }
    let reachable = reachable_tags(stake, catalog);
    def.required_tags.iter().all(|tag| reachable.contains(tag))
}

/// Fixpoint of the unlocked set over the catalog: every definition whose
/// requirements are reachable contributes its grants.
fn reachable_tags(stake: &ClaimStake, catalog: &Catalog) -> AHashSet<TagId> {
    let mut set = unlocked_closure(stake, catalog);
    expand(&mut set, catalog, stake.tier);
    set
}

fn expand(set: &mut AHashSet<TagId>, catalog: &Catalog, tier: Tier) {
    loop {
        let mut grew = false;
        for def in catalog.buildings() {
            if !def.admits_stake_tier(tier) {
                continue;
            }
            if !def.required_tags.iter().all(|tag| set.contains(tag)) {
                continue;
            }
            for tag in &def.added_tags {
                if set.insert(*tag) {
                    grew = true;
                }
            }
        }
        if !grew {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::core::types::Tier;

    const CHAIN_CATALOG: &str = r#"
[[planets]]
id = "rocky"
tags = ["rocky-planet"]

[[buildings]]
id = "alpha-station-t1"
family = "alpha-station"
tier = 1
added_tags = ["alpha"]

[[buildings]]
id = "beta-station-t1"
family = "beta-station"
tier = 1
min_stake_tier = 2
required_tags = ["alpha"]
added_tags = ["beta"]

[[buildings]]
id = "gamma-station-t1"
family = "gamma-station"
tier = 1
required_tags = ["beta"]
added_tags = ["gamma"]
"#;

    fn stake_on(catalog: &Catalog, tier: Tier) -> ClaimStake {
        let planet = catalog.planet_by_key("rocky").unwrap().id;
        ClaimStake::new(tier, planet, AHashSet::new())
    }

    #[test]
    fn test_unlocked_includes_planet_tags() {
        let catalog = Catalog::parse_toml(CHAIN_CATALOG).unwrap();
        let stake = stake_on(&catalog, Tier::T1);

        let unlocked = unlocked_closure(&stake, &catalog);
        let rocky = catalog.lookup_tag("rocky-planet").unwrap();
        assert!(unlocked.contains(&rocky));
    }

    #[test]
    fn test_unbuilt_definitions_grant_nothing() {
        let catalog = Catalog::parse_toml(CHAIN_CATALOG).unwrap();
        let stake = stake_on(&catalog, Tier::T5);

        let unlocked = unlocked_closure(&stake, &catalog);
        let alpha = catalog.lookup_tag("alpha").unwrap();
        assert!(!unlocked.contains(&alpha));
    }

    #[test]
    fn test_built_instances_contribute_added_tags() {
        let catalog = Catalog::parse_toml(CHAIN_CATALOG).unwrap();
        let mut stake = stake_on(&catalog, Tier::T1);

        let station = catalog.building_by_key("alpha-station-t1").unwrap();
        stake.add_instance(station, 0);

        let unlocked = unlocked_closure(&stake, &catalog);
        let alpha = catalog.lookup_tag("alpha").unwrap();
        assert!(unlocked.contains(&alpha));
    }

    #[test]
    fn test_eventually_unlockable_walks_the_chain() {
        let catalog = Catalog::parse_toml(CHAIN_CATALOG).unwrap();
        let stake = stake_on(&catalog, Tier::T2);

        // Nothing is built, but alpha -> beta -> gamma is all reachable
        // at T2.
        let gamma = catalog.lookup_tag("gamma").unwrap();
        assert!(eventually_unlockable(&stake, &catalog, gamma));
    }

    #[test]
    fn test_eventually_unlockable_respects_tier_gate() {
        let catalog = Catalog::parse_toml(CHAIN_CATALOG).unwrap();
        let stake = stake_on(&catalog, Tier::T1);

        // beta-station needs a T2 stake, so the chain past alpha can never
        // happen here.
        let beta = catalog.lookup_tag("beta").unwrap();
        let gamma = catalog.lookup_tag("gamma").unwrap();
        assert!(!eventually_unlockable(&stake, &catalog, beta));
        assert!(!eventually_unlockable(&stake, &catalog, gamma));
    }

    #[test]
    fn test_eventually_constructible() {
        let catalog = Catalog::parse_toml(CHAIN_CATALOG).unwrap();
        let stake = stake_on(&catalog, Tier::T2);

        let gamma_station = catalog.building_by_key("gamma-station-t1").unwrap();
        assert!(eventually_constructible(&stake, &catalog, gamma_station));

        let t1_stake = stake_on(&catalog, Tier::T1);
        assert!(!eventually_constructible(&t1_stake, &catalog, gamma_station));
    }
}
