//! Rate calculation - net per-second resource flow for a claim stake
//!
//! Two kinds of flow per building: `resource_rate` entries are applied
//! as-is (signed, consumption negative), while `extraction_rate` entries
//! are scaled by the planet's richness for that resource. Zero or absent
//! richness is a hard gate: the resource contributes no entry at all, not
//! a zero-rate entry.

use ahash::AHashMap;

use crate::catalog::{BuildingDefinition, Catalog};
use crate::core::types::ResourceId;
use crate::stake::claim::{BuildingInstance, ClaimStake};

/// Decides whether a building instance is currently running
///
/// The base engine treats every present building as operational; hosts
/// that model power or fuel outages plug in their own predicate.
pub trait OperationalPolicy {
    fn is_operational(
        &self,
        stake: &ClaimStake,
        instance: &BuildingInstance,
        def: &BuildingDefinition,
    ) -> bool;
}

/// Default policy: every present building runs
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOperational;

impl OperationalPolicy for AlwaysOperational {
    fn is_operational(
        &self,
        _stake: &ClaimStake,
        _instance: &BuildingInstance,
        _def: &BuildingDefinition,
    ) -> bool {
        true
    }
}

/// Aggregate net per-second rates across all operational instances
pub fn net_rates(
    stake: &ClaimStake,
    catalog: &Catalog,
    policy: &dyn OperationalPolicy,
) -> AHashMap<ResourceId, f32> {
    let planet = catalog.planet(stake.planet);
    let mut rates: AHashMap<ResourceId, f32> = AHashMap::new();

    for instance in &stake.instances {
        let def = catalog.building(instance.definition);
        if !policy.is_operational(stake, instance, def) {
            continue;
        }

        for (resource, rate) in &def.resource_rate {
            *rates.entry(*resource).or_insert(0.0) += rate;
        }

        for (resource, base_rate) in &def.extraction_rate {
            let richness = planet.richness_of(*resource);
            if richness > 0.0 {
                *rates.entry(*resource).or_insert(0.0) += base_rate * richness;
            }
        }
    }

    rates
}
