//! Construction and upgrade validation
//!
//! A request moves Requested -> Validated -> Committed, or Requested ->
//! Rejected. Validation runs every check and collects every failure so the
//! caller gets a complete report, never a generic one. Nothing is written
//! until all checks pass, so no rollback path exists.
//!
//! Affordability spans two pools: the requesting stake's ledger is drained
//! first, and any remainder comes from the other stakes' ledgers in
//! ascending stake-id order. The plan is computed during validation and
//! applied verbatim on commit, which keeps funding deterministic.

use ahash::AHashMap;

use crate::catalog::{BuildingDefinition, Catalog};
use crate::core::types::{DefId, InstanceId, ResourceId, StakeId, Tier};
use crate::stake::claim::ClaimStake;

/// One reason a command cannot be committed
#[derive(Debug, Clone, PartialEq)]
pub enum UnmetCondition {
    EngineNotStarted,
    UnknownStake(StakeId),
    DefinitionNotFound(String),
    /// Upgrade requested for an instance the stake does not hold
    UpgradeSourceMissing(InstanceId),
    /// No definition exists one tier up in the family
    UpgradeTargetMissing { family: String, tier: u8 },
    StakeTierTooLow { required: Tier, actual: Tier },
    StakeTierTooHigh { allowed: Tier, actual: Tier },
    TagLocked(String),
    HubAlreadyPresent(String),
    ResourceShortfall {
        resource: String,
        required: f32,
        available: f32,
    },
    UnknownResource(String),
    InvalidAmount { resource: String, amount: f32 },
}

impl std::fmt::Display for UnmetCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnmetCondition::EngineNotStarted => write!(f, "engine has not been started"),
            UnmetCondition::UnknownStake(id) => write!(f, "unknown claim stake {:?}", id.0),
            UnmetCondition::DefinitionNotFound(key) => {
                write!(f, "no building definition named {}", key)
            }
            UnmetCondition::UpgradeSourceMissing(id) => {
                write!(f, "no building instance {:?} on this claim stake", id.0)
            }
            UnmetCondition::UpgradeTargetMissing { family, tier } => {
                write!(f, "{} has no tier {} definition to upgrade into", family, tier)
            }
            UnmetCondition::StakeTierTooLow { required, actual } => {
                write!(f, "requires claim stake {} but this one is {}", required, actual)
            }
            UnmetCondition::StakeTierTooHigh { allowed, actual } => {
                write!(f, "only allowed up to {} but this stake is {}", allowed, actual)
            }
            UnmetCondition::TagLocked(tag) => write!(f, "tag {} is not unlocked", tag),
            UnmetCondition::HubAlreadyPresent(family) => {
                write!(f, "a {} hub already exists on this claim stake", family)
            }
            UnmetCondition::ResourceShortfall {
                resource,
                required,
                available,
            } => {
                write!(
                    f,
                    "{}: need {:.1}, have {:.1} (short {:.1})",
                    resource,
                    required,
                    available,
                    required - available
                )
            }
            UnmetCondition::UnknownResource(name) => write!(f, "unknown resource {}", name),
            UnmetCondition::InvalidAmount { resource, amount } => {
                write!(f, "invalid amount {:.1} for {}", amount, resource)
            }
        }
    }
}

/// A rejected command: the ordered list of everything that was unmet
#[derive(Debug, Clone, PartialEq)]
pub struct CommandFailure {
    pub conditions: Vec<UnmetCondition>,
}

impl CommandFailure {
    pub fn of(condition: UnmetCondition) -> Self {
        Self {
            conditions: vec![condition],
        }
    }
}

impl std::fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "command rejected: ")?;
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", condition)?;
        }
        Ok(())
    }
}

impl std::error::Error for CommandFailure {}

/// One ledger withdrawal within a funding plan
#[derive(Debug, Clone, PartialEq)]
pub struct FundingDraw {
    pub stake: StakeId,
    pub resource: ResourceId,
    pub amount: f32,
}

/// The exact withdrawals that will fund a commit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FundingPlan {
    pub draws: Vec<FundingDraw>,
}

impl FundingPlan {
    /// Total drawn from the given stake for the given resource
    pub fn drawn_from(&self, stake: StakeId, resource: ResourceId) -> f32 {
        self.draws
            .iter()
            .filter(|d| d.stake == stake && d.resource == resource)
            .map(|d| d.amount)
            .sum()
    }
}

/// A fully validated request, ready to commit
#[derive(Debug, Clone)]
pub struct ValidatedBuild {
    pub definition: DefId,
    /// Instance removed by an upgrade commit
    pub replaces: Option<InstanceId>,
    pub funding: FundingPlan,
}

/// Validate a construction request against a stake and the shared pools
pub fn validate_construct(
    stake: &ClaimStake,
    def: &BuildingDefinition,
    stakes: &AHashMap<StakeId, ClaimStake>,
    catalog: &Catalog,
) -> Result<ValidatedBuild, CommandFailure> {
    let (conditions, funding) = check_def(stake, def, None, stakes, catalog);
    if conditions.is_empty() {
        Ok(ValidatedBuild {
            definition: def.id,
            replaces: None,
            funding,
        })
    } else {
        Err(CommandFailure { conditions })
    }
}

/// Validate an upgrade request: the source instance must exist, a tier+1
/// definition must exist in the same family, and the target must pass the
/// same checks as a fresh build (with the source excluded from the hub
/// uniqueness check).
pub fn validate_upgrade(
    stake: &ClaimStake,
    instance: InstanceId,
    stakes: &AHashMap<StakeId, ClaimStake>,
    catalog: &Catalog,
) -> Result<ValidatedBuild, CommandFailure> {
    let Some(existing) = stake.instance(instance) else {
        return Err(CommandFailure::of(UnmetCondition::UpgradeSourceMissing(
            instance,
        )));
    };
    let current = catalog.building(existing.definition);
    let Some(target) = catalog.upgrade_target(current) else {
        return Err(CommandFailure::of(UnmetCondition::UpgradeTargetMissing {
            family: current.family.clone(),
            tier: current.tier.as_u8() + 1,
        }));
    };

    let (conditions, funding) = check_def(stake, target, Some(instance), stakes, catalog);
    if conditions.is_empty() {
        Ok(ValidatedBuild {
            definition: target.id,
            replaces: Some(instance),
            funding,
        })
    } else {
        Err(CommandFailure { conditions })
    }
}

/// Run the shared validation checks, collecting every failure in order:
/// tier gate, tag gate, hub uniqueness, affordability.
fn check_def(
    stake: &ClaimStake,
    def: &BuildingDefinition,
    exclude: Option<InstanceId>,
    stakes: &AHashMap<StakeId, ClaimStake>,
    catalog: &Catalog,
) -> (Vec<UnmetCondition>, FundingPlan) {
    let mut conditions = Vec::new();

    if stake.tier < def.min_stake_tier {
        conditions.push(UnmetCondition::StakeTierTooLow {
            required: def.min_stake_tier,
            actual: stake.tier,
        });
    } else if let Some(max) = def.max_stake_tier {
        if stake.tier > max {
            conditions.push(UnmetCondition::StakeTierTooHigh {
                allowed: max,
                actual: stake.tier,
            });
        }
    }

    let mut missing_tags: Vec<&str> = def
        .required_tags
        .iter()
        .filter(|tag| !stake.unlocked_tags.contains(tag))
        .map(|tag| catalog.tag_name(*tag))
        .collect();
    missing_tags.sort_unstable();
    for tag in missing_tags {
        conditions.push(UnmetCondition::TagLocked(tag.to_string()));
    }

    if def.hub && stake.has_hub_of_family(catalog, &def.family, exclude) {
        conditions.push(UnmetCondition::HubAlreadyPresent(def.family.clone()));
    }

    match plan_funding(&def.construction_cost, stake, stakes, catalog) {
        Ok(plan) => (conditions, plan),
        Err(shortfalls) => {
            conditions.extend(shortfalls);
            (conditions, FundingPlan::default())
        }
    }
}

/// Plan the withdrawals that cover `cost`: the home stake's ledger first,
/// then the remaining stakes in ascending id order. Cost entries are
/// processed in resource-id order so reports and draws are deterministic.
pub fn plan_funding(
    cost: &AHashMap<ResourceId, f32>,
    home: &ClaimStake,
    stakes: &AHashMap<StakeId, ClaimStake>,
    catalog: &Catalog,
) -> Result<FundingPlan, Vec<UnmetCondition>> {
    let mut entries: Vec<(ResourceId, f32)> = cost
        .iter()
        .filter(|(_, amount)| **amount > 0.0)
        .map(|(resource, amount)| (*resource, *amount))
        .collect();
    entries.sort_unstable_by_key(|(resource, _)| resource.0);

    let mut others: Vec<&ClaimStake> = stakes
        .values()
        .filter(|other| other.id != home.id)
        .collect();
    others.sort_unstable_by_key(|other| other.id);

    let mut draws = Vec::new();
    let mut shortfalls = Vec::new();

    for (resource, required) in entries {
        let mut remaining = required;

        let local = home.ledger.get(resource).min(remaining);
        if local > 0.0 {
            draws.push(FundingDraw {
                stake: home.id,
                resource,
                amount: local,
            });
            remaining -= local;
        }

        for other in &others {
            if remaining <= 0.0 {
                break;
            }
            let take = other.ledger.get(resource).min(remaining);
            if take > 0.0 {
                draws.push(FundingDraw {
                    stake: other.id,
                    resource,
                    amount: take,
                });
                remaining -= take;
            }
        }

        if remaining > 0.0 {
            shortfalls.push(UnmetCondition::ResourceShortfall {
                resource: catalog.resource_name(resource).to_string(),
                required,
                available: required - remaining,
            });
        }
    }

    if shortfalls.is_empty() {
        Ok(FundingPlan { draws })
    } else {
        Err(shortfalls)
    }
}

/// Apply a funding plan's withdrawals to the stake ledgers
pub fn apply_funding(plan: &FundingPlan, stakes: &mut AHashMap<StakeId, ClaimStake>) {
    for draw in &plan.draws {
        if let Some(stake) = stakes.get_mut(&draw.stake) {
            stake.ledger.debit(draw.resource, draw.amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use ahash::AHashSet;

    fn setup(catalog: &Catalog, tier: Tier) -> (AHashMap<StakeId, ClaimStake>, StakeId) {
        let planet = catalog.planet_by_key("terrestrial").unwrap().id;
        let mut stake = ClaimStake::new(tier, planet, AHashSet::new());
        let hub = catalog.building_by_key("central-hub-t1").unwrap();
        stake.add_instance(hub, 0);
        stake.refresh_derived(catalog);
        let id = stake.id;
        let mut stakes = AHashMap::new();
        stakes.insert(id, stake);
        (stakes, id)
    }

    fn credit(stakes: &mut AHashMap<StakeId, ClaimStake>, id: StakeId, resource: &str, amount: f32, catalog: &Catalog) {
        let rid = catalog.resource_by_name(resource).unwrap();
        stakes.get_mut(&id).unwrap().ledger.credit(rid, amount);
    }

    #[test]
    fn test_construct_succeeds_when_everything_met() {
        let catalog = Catalog::with_defaults();
        let (mut stakes, id) = setup(&catalog, Tier::T1);
        credit(&mut stakes, id, "steel", 100.0, &catalog);

        let def = catalog.building_by_key("hydrogen-extractor-t1").unwrap();
        let validated = validate_construct(&stakes[&id], def, &stakes, &catalog)
            .expect("should validate");
        assert_eq!(validated.definition, def.id);
        assert!(validated.replaces.is_none());

        let steel = catalog.resource_by_name("steel").unwrap();
        assert!((validated.funding.drawn_from(id, steel) - 60.0).abs() < 0.001);
    }

    #[test]
    fn test_shortfall_is_itemized_exactly() {
        let catalog = Catalog::with_defaults();
        let (mut stakes, id) = setup(&catalog, Tier::T1);
        credit(&mut stakes, id, "steel", 20.0, &catalog);

        let def = catalog.building_by_key("hydrogen-extractor-t1").unwrap();
        let failure = validate_construct(&stakes[&id], def, &stakes, &catalog)
            .expect_err("should be short");

        assert_eq!(failure.conditions.len(), 1);
        match &failure.conditions[0] {
            UnmetCondition::ResourceShortfall {
                resource,
                required,
                available,
            } => {
                assert_eq!(resource, "steel");
                assert!((required - 60.0).abs() < 0.001);
                assert!((available - 20.0).abs() < 0.001);
            }
            other => panic!("Expected ResourceShortfall, got {:?}", other),
        }
    }

    #[test]
    fn test_all_failures_collected_in_order() {
        let catalog = Catalog::with_defaults();
        // Bare stake: no hub built, no steel, and the refinery also wants T2
        let planet = catalog.planet_by_key("terrestrial").unwrap().id;
        let mut stake = ClaimStake::new(Tier::T1, planet, AHashSet::new());
        stake.refresh_derived(&catalog);
        let id = stake.id;
        let mut stakes = AHashMap::new();
        stakes.insert(id, stake);

        let def = catalog.building_by_key("steel-refinery-t1").unwrap();
        let failure = validate_construct(&stakes[&id], def, &stakes, &catalog)
            .expect_err("should fail");

        // Tier gate first, then both locked tags, then both cost shortfalls
        assert!(matches!(
            failure.conditions[0],
            UnmetCondition::StakeTierTooLow { .. }
        ));
        assert_eq!(
            failure.conditions[1],
            UnmetCondition::TagLocked("central-hub".into())
        );
        assert_eq!(
            failure.conditions[2],
            UnmetCondition::TagLocked("grid-power".into())
        );
        assert_eq!(
            failure
                .conditions
                .iter()
                .filter(|c| matches!(c, UnmetCondition::ResourceShortfall { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn test_hub_uniqueness_rejected() {
        let catalog = Catalog::with_defaults();
        let (mut stakes, id) = setup(&catalog, Tier::T1);
        credit(&mut stakes, id, "steel", 500.0, &catalog);

        let hub = catalog.building_by_key("central-hub-t1").unwrap();
        let failure = validate_construct(&stakes[&id], hub, &stakes, &catalog)
            .expect_err("second hub must fail");
        assert_eq!(
            failure.conditions,
            vec![UnmetCondition::HubAlreadyPresent("central-hub".into())]
        );
    }

    #[test]
    fn test_funding_drains_local_before_global() {
        let catalog = Catalog::with_defaults();
        let (mut stakes, home) = setup(&catalog, Tier::T1);
        credit(&mut stakes, home, "steel", 40.0, &catalog);

        // A second stake holds the remainder
        let planet = catalog.planet_by_key("volcanic").unwrap().id;
        let mut other = ClaimStake::new(Tier::T1, planet, AHashSet::new());
        other.refresh_derived(&catalog);
        let other_id = other.id;
        stakes.insert(other_id, other);
        credit(&mut stakes, other_id, "steel", 100.0, &catalog);

        let steel = catalog.resource_by_name("steel").unwrap();
        let def = catalog.building_by_key("hydrogen-extractor-t1").unwrap();
        let validated = validate_construct(&stakes[&home], def, &stakes, &catalog)
            .expect("funded across pools");

        assert!((validated.funding.drawn_from(home, steel) - 40.0).abs() < 0.001);
        assert!((validated.funding.drawn_from(other_id, steel) - 20.0).abs() < 0.001);

        // Conservation: draws sum to the cost exactly
        let total: f32 = validated.funding.draws.iter().map(|d| d.amount).sum();
        assert!((total - 60.0).abs() < 0.001);
    }

    #[test]
    fn test_global_draw_order_is_ascending_stake_id() {
        let catalog = Catalog::with_defaults();
        let (mut stakes, home) = setup(&catalog, Tier::T1);

        let planet = catalog.planet_by_key("volcanic").unwrap().id;
        let mut ids = Vec::new();
        for _ in 0..3 {
            let mut other = ClaimStake::new(Tier::T1, planet, AHashSet::new());
            other.refresh_derived(&catalog);
            let id = other.id;
            stakes.insert(id, other);
            credit(&mut stakes, id, "steel", 25.0, &catalog);
            ids.push(id);
        }
        ids.sort();

        let def = catalog.building_by_key("hydrogen-extractor-t1").unwrap();
        let validated = validate_construct(&stakes[&home], def, &stakes, &catalog)
            .expect("funded from the pool");

        // 60 steel out of 3x25: the two lowest ids drain fully, the third
        // covers the remainder.
        let draw_stakes: Vec<StakeId> = validated.funding.draws.iter().map(|d| d.stake).collect();
        assert_eq!(draw_stakes, vec![ids[0], ids[1], ids[2]]);
        assert!((validated.funding.draws[2].amount - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_upgrade_requires_live_source() {
        let catalog = Catalog::with_defaults();
        let (stakes, id) = setup(&catalog, Tier::T2);

        let missing = InstanceId::new();
        let failure = validate_upgrade(&stakes[&id], missing, &stakes, &catalog)
            .expect_err("missing source");
        assert_eq!(
            failure.conditions,
            vec![UnmetCondition::UpgradeSourceMissing(missing)]
        );
    }

    #[test]
    fn test_upgrade_resolves_family_target() {
        let catalog = Catalog::with_defaults();
        let (mut stakes, id) = setup(&catalog, Tier::T2);
        credit(&mut stakes, id, "steel", 200.0, &catalog);
        credit(&mut stakes, id, "electronics", 20.0, &catalog);

        let extractor = catalog.building_by_key("hydrogen-extractor-t1").unwrap();
        let instance = {
            let stake = stakes.get_mut(&id).unwrap();
            let instance = stake.add_instance(extractor, 0);
            stake.refresh_derived(&catalog);
            instance
        };

        let validated = validate_upgrade(&stakes[&id], instance, &stakes, &catalog)
            .expect("upgrade should validate");
        let target = catalog.building(validated.definition);
        assert_eq!(target.key, "hydrogen-extractor-t2");
        assert_eq!(validated.replaces, Some(instance));
    }

    #[test]
    fn test_upgrade_at_top_of_family_fails() {
        let catalog = Catalog::with_defaults();
        let (mut stakes, id) = setup(&catalog, Tier::T2);

        let t2 = catalog.building_by_key("hydrogen-extractor-t2").unwrap();
        let instance = {
            let stake = stakes.get_mut(&id).unwrap();
            let instance = stake.add_instance(t2, 0);
            stake.refresh_derived(&catalog);
            instance
        };

        let failure = validate_upgrade(&stakes[&id], instance, &stakes, &catalog)
            .expect_err("no T3 exists");
        assert_eq!(
            failure.conditions,
            vec![UnmetCondition::UpgradeTargetMissing {
                family: "hydrogen-extractor".into(),
                tier: 3,
            }]
        );
    }

    #[test]
    fn test_validation_never_mutates() {
        let catalog = Catalog::with_defaults();
        let (mut stakes, id) = setup(&catalog, Tier::T1);
        credit(&mut stakes, id, "steel", 20.0, &catalog);

        let def = catalog.building_by_key("hydrogen-extractor-t1").unwrap();
        let steel = catalog.resource_by_name("steel").unwrap();
        let before = stakes[&id].ledger.get(steel);
        let count_before = stakes[&id].instances.len();

        let _ = validate_construct(&stakes[&id], def, &stakes, &catalog);

        assert!((stakes[&id].ledger.get(steel) - before).abs() < 0.001);
        assert_eq!(stakes[&id].instances.len(), count_before);
    }
}
