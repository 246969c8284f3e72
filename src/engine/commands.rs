//! Command payloads: initial state going in, receipts coming out

use ahash::AHashMap;
use serde::Serialize;

use crate::core::types::{InstanceId, Tier};
use crate::engine::snapshot::{OrderSnapshot, StakeSnapshot};

/// Success payload of a mutating command
#[derive(Debug, Clone, Serialize)]
pub struct CommandReceipt {
    /// The affected stake, after the commit
    pub stake: StakeSnapshot,
    /// The global pool, after the commit
    pub global_resources: AHashMap<String, f32>,
    /// Instance created by a construct or upgrade commit
    pub instance: Option<InstanceId>,
    /// Order record for a construct or upgrade commit
    pub order: Option<OrderSnapshot>,
}

/// World state handed to `Engine::start`
#[derive(Debug, Clone, Default)]
pub struct InitialState {
    pub stakes: Vec<StakeSetup>,
}

impl InitialState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stake(mut self, stake: StakeSetup) -> Self {
        self.stakes.push(stake);
        self
    }
}

/// One claim stake in the initial state
///
/// Buildings listed here are pre-existing and enter the world without
/// validation or cost; resources seed the stake's ledger.
#[derive(Debug, Clone)]
pub struct StakeSetup {
    pub planet: String,
    pub tier: Tier,
    pub tags: Vec<String>,
    pub resources: Vec<(String, f32)>,
    pub buildings: Vec<String>,
}

impl StakeSetup {
    pub fn new(planet: impl Into<String>, tier: Tier) -> Self {
        Self {
            planet: planet.into(),
            tier,
            tags: Vec::new(),
            resources: Vec::new(),
            buildings: Vec::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>, amount: f32) -> Self {
        self.resources.push((resource.into(), amount));
        self
    }

    pub fn with_building(mut self, key: impl Into<String>) -> Self {
        self.buildings.push(key.into());
        self
    }
}
