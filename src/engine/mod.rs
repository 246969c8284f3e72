//! Engine facade - the single writer over all simulation state
//!
//! Every mutation (clock pulses, construction, upgrades, resource grants)
//! goes through `&mut Engine`, so commands and ticks serialize in call
//! order and nothing can interleave mid-mutation. External collaborators
//! only ever receive cloned snapshots through receipts or subscriptions.
//!
//! Commands validate fully before touching state; a rejected command
//! leaves the engine exactly as it was.

pub mod commands;
pub mod snapshot;
pub mod subscription;

use std::time::Instant;

use ahash::{AHashMap, AHashSet};

use crate::catalog::Catalog;
use crate::core::config::EngineConfig;
use crate::core::error::{EngineError, Result};
use crate::core::types::{InstanceId, ResourceId, StakeId, Tick};
use crate::simulation::clock::SimClock;
use crate::simulation::pool::recompute_pool;
use crate::simulation::tick::{run_tick, TickOutcome};
use crate::stake::claim::{ClaimStake, ConstructionOrder};
use crate::stake::construction::{
    self, CommandFailure, UnmetCondition, ValidatedBuild,
};
use crate::stake::rates::{AlwaysOperational, OperationalPolicy};

pub use commands::{CommandReceipt, InitialState, StakeSetup};
pub use snapshot::{
    snapshot_stake, EngineSnapshot, InstanceSnapshot, OrderSnapshot, StakeSnapshot,
};
pub use subscription::{SubscriberRegistry, SubscriptionId};

/// The simulation and economy engine
pub struct Engine {
    catalog: Catalog,
    config: EngineConfig,
    policy: Box<dyn OperationalPolicy>,
    clock: SimClock,
    stakes: AHashMap<StakeId, ClaimStake>,
    global_pool: AHashMap<ResourceId, f32>,
    tick: Tick,
    game_time: f64,
    subscribers: SubscriberRegistry,
    started: bool,
}

impl Engine {
    pub fn new(catalog: Catalog, config: EngineConfig) -> Self {
        Self {
            catalog,
            config,
            policy: Box::new(AlwaysOperational),
            clock: SimClock::new(),
            stakes: AHashMap::new(),
            global_pool: AHashMap::new(),
            tick: 0,
            game_time: 0.0,
            subscribers: SubscriberRegistry::new(),
            started: false,
        }
    }

    /// Replace the operational predicate used by the rate calculator
    pub fn with_policy(mut self, policy: Box<dyn OperationalPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // --- lifecycle ---

    /// Load the initial world state and start the clock
    ///
    /// Calling `start` again replaces the previous state entirely.
    pub fn start(&mut self, initial: InitialState) -> Result<EngineSnapshot> {
        let mut stakes = AHashMap::new();

        for setup in &initial.stakes {
            let planet = self
                .catalog
                .planet_by_key(&setup.planet)
                .ok_or_else(|| EngineError::UnknownPlanet(setup.planet.clone()))?;

            let mut base_tags = AHashSet::new();
            for tag in &setup.tags {
                let id = self
                    .catalog
                    .lookup_tag(tag)
                    .ok_or_else(|| EngineError::UnknownTag(tag.clone()))?;
                base_tags.insert(id);
            }

            let mut stake = ClaimStake::new(setup.tier, planet.id, base_tags);

            for (resource, amount) in &setup.resources {
                let id = self
                    .catalog
                    .resource_by_name(resource)
                    .ok_or_else(|| EngineError::UnknownResource(resource.clone()))?;
                stake.ledger.credit(id, *amount);
            }

            for key in &setup.buildings {
                let def = self
                    .catalog
                    .building_by_key(key)
                    .ok_or_else(|| EngineError::UnknownBuilding(key.clone()))?;
                stake.add_instance(def, 0);
            }

            stake.refresh_derived(&self.catalog);
            stakes.insert(stake.id, stake);
        }

        self.stakes = stakes;
        self.global_pool = recompute_pool(self.stakes.values());
        self.tick = 0;
        self.game_time = 0.0;
        self.started = true;
        self.clock.start();

        tracing::info!("Engine started with {} claim stakes", self.stakes.len());
        Ok(self.snapshot())
    }

    /// Halt the clock; state remains queryable and commands still apply
    pub fn stop(&mut self) {
        self.clock.stop();
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.clock.set_paused(paused);
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn set_speed(&mut self, speed: f32) -> Result<()> {
        if !speed.is_finite() || speed < 0.0 {
            return Err(EngineError::InvalidSpeed(speed));
        }
        self.clock.set_speed(speed);
        Ok(())
    }

    pub fn speed(&self) -> f32 {
        self.clock.speed()
    }

    // --- ticking ---

    /// Pulse the clock with the current wall-clock time
    pub fn tick(&mut self) -> TickOutcome {
        self.tick_at(Instant::now())
    }

    /// Pulse the clock with an explicit timestamp (deterministic hosts and
    /// tests drive this directly)
    pub fn tick_at(&mut self, now: Instant) -> TickOutcome {
        let dt = self.clock.advance(now);
        if self.started {
            self.tick += 1;
        }
        self.game_time += dt as f64;

        let (max_delta, changed) = run_tick(
            &mut self.stakes,
            &self.catalog,
            self.policy.as_ref(),
            dt,
            self.config.change_epsilon,
        );
        self.global_pool = recompute_pool(self.stakes.values());

        if changed {
            self.notify();
        }

        TickOutcome {
            tick: self.tick,
            dt,
            max_delta,
            changed,
        }
    }

    // --- commands ---

    /// Construct a building on a claim stake
    pub fn construct(
        &mut self,
        building: &str,
        stake_id: StakeId,
    ) -> std::result::Result<CommandReceipt, CommandFailure> {
        self.ensure_started()?;
        let Some(stake) = self.stakes.get(&stake_id) else {
            return Err(CommandFailure::of(UnmetCondition::UnknownStake(stake_id)));
        };
        let Some(def) = self.catalog.building_by_key(building) else {
            return Err(CommandFailure::of(UnmetCondition::DefinitionNotFound(
                building.to_string(),
            )));
        };

        let validated = construction::validate_construct(stake, def, &self.stakes, &self.catalog)?;
        self.commit(stake_id, validated)
    }

    /// Upgrade an existing instance to the next tier in its family
    pub fn upgrade(
        &mut self,
        instance: InstanceId,
        stake_id: StakeId,
    ) -> std::result::Result<CommandReceipt, CommandFailure> {
        self.ensure_started()?;
        let Some(stake) = self.stakes.get(&stake_id) else {
            return Err(CommandFailure::of(UnmetCondition::UnknownStake(stake_id)));
        };

        let validated =
            construction::validate_upgrade(stake, instance, &self.stakes, &self.catalog)?;
        self.commit(stake_id, validated)
    }

    /// Grant resources to a stake's ledger (and thereby the global pool)
    pub fn receive_resources(
        &mut self,
        stake_id: StakeId,
        amounts: &[(&str, f32)],
    ) -> std::result::Result<CommandReceipt, CommandFailure> {
        self.ensure_started()?;
        if !self.stakes.contains_key(&stake_id) {
            return Err(CommandFailure::of(UnmetCondition::UnknownStake(stake_id)));
        }

        // Resolve everything before touching any ledger
        let mut resolved = Vec::with_capacity(amounts.len());
        let mut conditions = Vec::new();
        for (resource, amount) in amounts {
            match self.catalog.resource_by_name(resource) {
                Some(id) if *amount >= 0.0 => resolved.push((id, *amount)),
                Some(_) => conditions.push(UnmetCondition::InvalidAmount {
                    resource: crate::catalog::canonicalize(resource),
                    amount: *amount,
                }),
                None => conditions.push(UnmetCondition::UnknownResource(
                    crate::catalog::canonicalize(resource),
                )),
            }
        }
        if !conditions.is_empty() {
            return Err(CommandFailure { conditions });
        }

        if let Some(stake) = self.stakes.get_mut(&stake_id) {
            for (resource, amount) in resolved {
                stake.ledger.credit(resource, amount);
            }
        }
        self.global_pool = recompute_pool(self.stakes.values());

        let receipt = self.receipt(stake_id, None, None)?;
        self.notify();
        Ok(receipt)
    }

    // --- queries ---

    /// Immutable snapshot of the whole engine state
    pub fn snapshot(&self) -> EngineSnapshot {
        let claim_stakes = self
            .stakes
            .values()
            .map(|stake| (stake.id, snapshot_stake(stake, &self.catalog, self.game_time)))
            .collect();
        EngineSnapshot {
            tick: self.tick,
            game_time: self.game_time,
            claim_stakes,
            global_resources: snapshot::resource_names(&self.global_pool, &self.catalog),
        }
    }

    pub fn stake(&self, id: StakeId) -> Option<&ClaimStake> {
        self.stakes.get(&id)
    }

    /// All stake ids in ascending order
    pub fn stake_ids(&self) -> Vec<StakeId> {
        let mut ids: Vec<StakeId> = self.stakes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Global pool amount for a resource name, 0.0 when absent or unknown
    pub fn global_amount(&self, resource: &str) -> f32 {
        self.catalog
            .resource_by_name(resource)
            .and_then(|id| self.global_pool.get(&id))
            .copied()
            .unwrap_or(0.0)
    }

    // --- subscriptions ---

    pub fn subscribe(
        &mut self,
        callback: Box<dyn FnMut(&EngineSnapshot)>,
    ) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // --- internals ---

    fn ensure_started(&self) -> std::result::Result<(), CommandFailure> {
        if self.started {
            Ok(())
        } else {
            Err(CommandFailure::of(UnmetCondition::EngineNotStarted))
        }
    }

    /// Apply a validated build: withdraw funding, swap instances, refresh
    /// derived state, recompute the pool, notify.
    fn commit(
        &mut self,
        stake_id: StakeId,
        validated: ValidatedBuild,
    ) -> std::result::Result<CommandReceipt, CommandFailure> {
        construction::apply_funding(&validated.funding, &mut self.stakes);

        let def = self.catalog.building(validated.definition);
        let tick = self.tick;
        let game_time = self.game_time;

        let Some(stake) = self.stakes.get_mut(&stake_id) else {
            return Err(CommandFailure::of(UnmetCondition::UnknownStake(stake_id)));
        };
        if let Some(old) = validated.replaces {
            stake.remove_instance(old);
        }
        let instance = stake.add_instance(def, tick);
        let order = ConstructionOrder {
            building: def.id,
            instance,
            started_at: game_time,
            completed_at: game_time,
        };
        let order_snapshot = snapshot::snapshot_order(&order, &self.catalog, game_time);
        stake.orders.push(order);
        stake.refresh_derived(&self.catalog);

        tracing::debug!(
            "Committed {} on stake {} (replaced: {})",
            def.key,
            stake_id.0,
            validated.replaces.is_some()
        );

        self.global_pool = recompute_pool(self.stakes.values());

        let receipt = self.receipt(stake_id, Some(instance), Some(order_snapshot))?;
        self.notify();
        Ok(receipt)
    }

    fn receipt(
        &self,
        stake_id: StakeId,
        instance: Option<InstanceId>,
        order: Option<OrderSnapshot>,
    ) -> std::result::Result<CommandReceipt, CommandFailure> {
        let Some(stake) = self.stakes.get(&stake_id) else {
            return Err(CommandFailure::of(UnmetCondition::UnknownStake(stake_id)));
        };
        Ok(CommandReceipt {
            stake: snapshot_stake(stake, &self.catalog, self.game_time),
            global_resources: snapshot::resource_names(&self.global_pool, &self.catalog),
            instance,
            order,
        })
    }

    fn notify(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        self.subscribers.notify(&snapshot);
    }
}
