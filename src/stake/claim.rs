//! Claim stake - a player-owned production site
//!
//! A claim stake exclusively owns its building instances and its resource
//! ledger. The unlocked-tag closure and the capacity stats are derived
//! caches, refreshed after every tick and every committed command.

use ahash::AHashSet;

use crate::catalog::{BuildingDefinition, Catalog};
use crate::core::types::{DefId, GameTime, InstanceId, PlanetId, StakeId, TagId, Tick, Tier};
use crate::stake::capacity::{self, CrewStats, PowerStats, StorageStats};
use crate::stake::ledger::ResourceLedger;
use crate::stake::tags;

/// A single constructed building belonging to exactly one claim stake
#[derive(Debug, Clone)]
pub struct BuildingInstance {
    pub id: InstanceId,
    pub definition: DefId,
    /// The definition's tier, copied for convenience
    pub tier: Tier,
    /// Back-reference to the owning stake
    pub stake: StakeId,
    /// Tick at which the instance came into existence
    pub built_at: Tick,
}

/// Record of an accepted construction request
///
/// Construction is atomic on acceptance, so start and end coincide; the
/// record is kept as per-stake history and surfaced in command receipts.
#[derive(Debug, Clone)]
pub struct ConstructionOrder {
    pub building: DefId,
    pub instance: InstanceId,
    pub started_at: GameTime,
    pub completed_at: GameTime,
}

impl ConstructionOrder {
    /// Fraction complete at the given game time
    pub fn progress(&self, now: GameTime) -> f32 {
        let total = self.completed_at - self.started_at;
        if total <= 0.0 || now >= self.completed_at {
            return 1.0;
        }
        (((now - self.started_at) / total).max(0.0)) as f32
    }
}

/// A player-owned production site
#[derive(Debug, Clone)]
pub struct ClaimStake {
    pub id: StakeId,
    pub tier: Tier,
    pub planet: PlanetId,
    /// Tags the stake starts with: planet tags plus any granted at creation
    pub base_tags: AHashSet<TagId>,
    /// Owned building instances; insertion order carries no meaning
    pub instances: Vec<BuildingInstance>,
    pub ledger: ResourceLedger,
    /// Cached unlocked-tag closure
    pub unlocked_tags: AHashSet<TagId>,
    /// History of accepted construction orders
    pub orders: Vec<ConstructionOrder>,
    pub power: PowerStats,
    pub crew: CrewStats,
    pub storage: StorageStats,
}

impl ClaimStake {
    pub fn new(tier: Tier, planet: PlanetId, base_tags: AHashSet<TagId>) -> Self {
        Self {
            id: StakeId::new(),
            tier,
            planet,
            base_tags,
            instances: Vec::new(),
            ledger: ResourceLedger::new(),
            unlocked_tags: AHashSet::new(),
            orders: Vec::new(),
            power: PowerStats::default(),
            crew: CrewStats::default(),
            storage: StorageStats::default(),
        }
    }

    pub fn instance(&self, id: InstanceId) -> Option<&BuildingInstance> {
        self.instances.iter().find(|i| i.id == id)
    }

    /// Create an instance of the given definition on this stake
    pub fn add_instance(&mut self, def: &BuildingDefinition, tick: Tick) -> InstanceId {
        let id = InstanceId::new();
        self.instances.push(BuildingInstance {
            id,
            definition: def.id,
            tier: def.tier,
            stake: self.id,
            built_at: tick,
        });
        id
    }

    /// Remove an instance, returning it if present
    pub fn remove_instance(&mut self, id: InstanceId) -> Option<BuildingInstance> {
        let index = self.instances.iter().position(|i| i.id == id)?;
        Some(self.instances.swap_remove(index))
    }

    /// Whether some instance of the given hub family exists, optionally
    /// ignoring one instance (the one being replaced by an upgrade)
    pub fn has_hub_of_family(
        &self,
        catalog: &Catalog,
        family: &str,
        exclude: Option<InstanceId>,
    ) -> bool {
        self.instances.iter().any(|instance| {
            if Some(instance.id) == exclude {
                return false;
            }
            let def = catalog.building(instance.definition);
            def.hub && def.family == family
        })
    }

    /// Number of instances belonging to the given family, across all tiers
    pub fn family_count(&self, catalog: &Catalog, family: &str) -> usize {
        self.instances
            .iter()
            .filter(|instance| catalog.building(instance.definition).family == family)
            .count()
    }

    /// Recompute the tag closure and the capacity caches
    pub fn refresh_derived(&mut self, catalog: &Catalog) {
        self.unlocked_tags = tags::unlocked_closure(self, catalog);
        self.power = capacity::power_stats(self, catalog);
        self.crew = capacity::crew_stats(self, catalog);
        self.storage = capacity::storage_stats(self, catalog);
    }
}
