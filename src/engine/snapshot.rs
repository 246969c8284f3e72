//! Immutable state snapshots handed to external collaborators
//!
//! Snapshots are the only thing readers ever see: cloned data, canonical
//! string identifiers instead of interned ids, serializable as-is.

use ahash::AHashMap;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::core::types::{GameTime, InstanceId, ResourceId, StakeId, Tick};
use crate::stake::capacity::{CrewStats, PowerStats, StorageStats};
use crate::stake::claim::{ClaimStake, ConstructionOrder};

/// One building instance, in external form
#[derive(Debug, Clone, Serialize)]
pub struct InstanceSnapshot {
    pub id: InstanceId,
    /// Canonical definition key
    pub building: String,
    pub name: String,
    pub tier: u8,
    pub hub: bool,
}

/// One accepted construction order, in external form
#[derive(Debug, Clone, Serialize)]
pub struct OrderSnapshot {
    /// Canonical definition key
    pub building: String,
    pub instance: InstanceId,
    pub started_at: GameTime,
    pub completed_at: GameTime,
    /// Fraction complete as of the snapshot's game time
    pub progress: f32,
}

/// One claim stake, in external form
#[derive(Debug, Clone, Serialize)]
pub struct StakeSnapshot {
    pub id: StakeId,
    pub tier: u8,
    pub planet: String,
    pub buildings: Vec<InstanceSnapshot>,
    /// Accepted construction orders, oldest first
    pub orders: Vec<OrderSnapshot>,
    pub resources: AHashMap<String, f32>,
    /// Sorted for stable output
    pub unlocked_tags: Vec<String>,
    pub power: PowerStats,
    pub crew: CrewStats,
    pub storage: StorageStats,
}

/// The whole engine state, in external form
#[derive(Debug, Clone, Serialize)]
pub struct EngineSnapshot {
    pub tick: Tick,
    pub game_time: GameTime,
    pub claim_stakes: AHashMap<StakeId, StakeSnapshot>,
    pub global_resources: AHashMap<String, f32>,
}

/// Convert an interned amount map to canonical resource names
pub fn resource_names(
    amounts: &AHashMap<ResourceId, f32>,
    catalog: &Catalog,
) -> AHashMap<String, f32> {
    amounts
        .iter()
        .map(|(id, amount)| (catalog.resource_name(*id).to_string(), *amount))
        .collect()
}

pub fn snapshot_order(order: &ConstructionOrder, catalog: &Catalog, now: GameTime) -> OrderSnapshot {
    OrderSnapshot {
        building: catalog.building(order.building).key.clone(),
        instance: order.instance,
        started_at: order.started_at,
        completed_at: order.completed_at,
        progress: order.progress(now),
    }
}

pub fn snapshot_stake(stake: &ClaimStake, catalog: &Catalog, now: GameTime) -> StakeSnapshot {
    let buildings = stake
        .instances
        .iter()
        .map(|instance| {
            let def = catalog.building(instance.definition);
            InstanceSnapshot {
                id: instance.id,
                building: def.key.clone(),
                name: def.name.clone(),
                tier: def.tier.as_u8(),
                hub: def.hub,
            }
        })
        .collect();

    let orders = stake
        .orders
        .iter()
        .map(|order| snapshot_order(order, catalog, now))
        .collect();

    let mut unlocked_tags: Vec<String> = stake
        .unlocked_tags
        .iter()
        .map(|tag| catalog.tag_name(*tag).to_string())
        .collect();
    unlocked_tags.sort_unstable();

    let resources = stake
        .ledger
        .iter()
        .map(|(id, amount)| (catalog.resource_name(id).to_string(), amount))
        .collect();

    StakeSnapshot {
        id: stake.id,
        tier: stake.tier.as_u8(),
        planet: catalog.planet(stake.planet).key.clone(),
        buildings,
        orders,
        resources,
        unlocked_tags,
        power: stake.power,
        crew: stake.crew,
        storage: stake.storage,
    }
}
