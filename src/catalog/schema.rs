//! Static game-data definitions
//!
//! These types are the validated, interned form of the catalog: every
//! resource and tag name has been normalized and replaced by a dense id,
//! so nothing downstream ever does string matching at runtime.

use ahash::{AHashMap, AHashSet};

use crate::core::types::{DefId, PlanetId, ResourceId, TagId, Tier};

/// A resource kind known to the catalog
#[derive(Debug, Clone)]
pub struct ResourceDefinition {
    pub id: ResourceId,
    /// Canonical name (normalized at load time)
    pub name: String,
}

/// Static definition of a building line member
///
/// Definitions come in families: `hydrogen-extractor` tier 1 and tier 2 are
/// two definitions sharing one family key. Upgrades walk the family ladder.
#[derive(Debug, Clone)]
pub struct BuildingDefinition {
    pub id: DefId,
    /// Canonical string key, e.g. `hydrogen-extractor-t1`
    pub key: String,
    /// Display name
    pub name: String,
    /// Family key tying the tiers of one building line together
    pub family: String,
    /// This definition's own tier within its family
    pub tier: Tier,
    /// Hubs are unique per family per claim stake; modules may repeat
    pub hub: bool,
    /// Signed power: positive generates, negative consumes
    pub power: f32,
    /// Crew capacity this building provides
    pub crew_slots: u32,
    /// Crew demand this building adds
    pub crew_needed: u32,
    /// Storage contribution (advisory, never enforced as a cap)
    pub storage: f32,
    /// Resources consumed when constructing this building
    pub construction_cost: AHashMap<ResourceId, f32>,
    /// Signed per-second deltas, applied as-is (not richness-scaled)
    pub resource_rate: AHashMap<ResourceId, f32>,
    /// Base per-second extraction rates, scaled by planet richness
    pub extraction_rate: AHashMap<ResourceId, f32>,
    /// All of these must be in the stake's tag closure to build
    pub required_tags: AHashSet<TagId>,
    /// Granted to the stake once built
    pub added_tags: AHashSet<TagId>,
    /// Minimum claim-stake tier that admits this building
    pub min_stake_tier: Tier,
    /// Maximum claim-stake tier, if gated from above
    pub max_stake_tier: Option<Tier>,
}

impl BuildingDefinition {
    /// Whether a claim stake of the given tier may host this building
    pub fn admits_stake_tier(&self, tier: Tier) -> bool {
        if tier < self.min_stake_tier {
            return false;
        }
        match self.max_stake_tier {
            Some(max) => tier <= max,
            None => true,
        }
    }
}

/// Static planet archetype: identity tags plus extraction richness
#[derive(Debug, Clone)]
pub struct PlanetArchetype {
    pub id: PlanetId,
    /// Canonical string key, e.g. `volcanic`
    pub key: String,
    pub name: String,
    /// Tags identifying the planet type and owning faction
    pub tags: AHashSet<TagId>,
    /// Per-resource multiplier in [0, 1]; absent or 0 means the resource
    /// does not occur here at all
    pub richness: AHashMap<ResourceId, f32>,
}

impl PlanetArchetype {
    /// Richness multiplier for a resource, 0.0 when absent
    pub fn richness_of(&self, resource: ResourceId) -> f32 {
        self.richness.get(&resource).copied().unwrap_or(0.0)
    }
}
