//! Capacity aggregation - power, crew, and storage totals per claim stake
//!
//! Pure reductions over the stake's building instances, recomputed every
//! tick and after every committed command. No delta state is persisted.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::stake::claim::ClaimStake;

/// Power generation vs consumption across a stake
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PowerStats {
    pub generation: f32,
    pub consumption: f32,
    pub net: f32,
}

/// Crew capacity vs demand across a stake
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CrewStats {
    pub slots: u32,
    pub needed: u32,
    /// Slots minus demand; negative when overcommitted
    pub available: i64,
}

/// Total storage contribution (advisory only)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StorageStats {
    pub capacity: f32,
}

pub fn power_stats(stake: &ClaimStake, catalog: &Catalog) -> PowerStats {
    let mut stats = PowerStats::default();
    for instance in &stake.instances {
        let power = catalog.building(instance.definition).power;
        if power > 0.0 {
            stats.generation += power;
        } else {
            stats.consumption += -power;
        }
    }
    stats.net = stats.generation - stats.consumption;
    stats
}

pub fn crew_stats(stake: &ClaimStake, catalog: &Catalog) -> CrewStats {
    let mut stats = CrewStats::default();
    for instance in &stake.instances {
        let def = catalog.building(instance.definition);
        stats.slots += def.crew_slots;
        stats.needed += def.crew_needed;
    }
    stats.available = stats.slots as i64 - stats.needed as i64;
    stats
}

pub fn storage_stats(stake: &ClaimStake, catalog: &Catalog) -> StorageStats {
    let mut stats = StorageStats::default();
    for instance in &stake.instances {
        stats.capacity += catalog.building(instance.definition).storage;
    }
    stats
}
