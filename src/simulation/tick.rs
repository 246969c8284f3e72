//! Tick system - advances every claim stake by one game-time delta
//!
//! Per stake and per tick, the order is fixed: refresh the tag closure,
//! derive net rates, apply them to the ledger, then refresh the capacity
//! caches. The caller recomputes the global pool afterwards.

use ahash::AHashMap;

use crate::catalog::Catalog;
use crate::core::types::{StakeId, Tick};
use crate::stake::claim::ClaimStake;
use crate::stake::rates::{net_rates, OperationalPolicy};

/// Result of one engine tick
#[derive(Debug, Clone, Copy)]
pub struct TickOutcome {
    pub tick: Tick,
    /// Game seconds applied this tick (already speed-scaled)
    pub dt: f32,
    /// Largest single ledger movement observed
    pub max_delta: f32,
    /// Whether the movement crossed the notification threshold
    pub changed: bool,
}

/// Advance one stake, returning the largest ledger movement
pub fn advance_stake(
    stake: &mut ClaimStake,
    catalog: &Catalog,
    policy: &dyn OperationalPolicy,
    dt: f32,
) -> f32 {
    stake.unlocked_tags = crate::stake::tags::unlocked_closure(stake, catalog);
    let rates = net_rates(stake, catalog, policy);
    let max_delta = stake.ledger.apply_rates(&rates, dt);
    stake.power = crate::stake::capacity::power_stats(stake, catalog);
    stake.crew = crate::stake::capacity::crew_stats(stake, catalog);
    stake.storage = crate::stake::capacity::storage_stats(stake, catalog);
    max_delta
}

/// Advance every stake, reporting whether any ledger moved past epsilon
pub fn run_tick(
    stakes: &mut AHashMap<StakeId, ClaimStake>,
    catalog: &Catalog,
    policy: &dyn OperationalPolicy,
    dt: f32,
    epsilon: f32,
) -> (f32, bool) {
    let mut max_delta: f32 = 0.0;
    for stake in stakes.values_mut() {
        let delta = advance_stake(stake, catalog, policy, dt);
        if delta > max_delta {
            max_delta = delta;
        }
    }
    (max_delta, max_delta > epsilon)
}
