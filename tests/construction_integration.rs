//! Construction and upgrade integration tests
//!
//! Full command-surface coverage of the construction state machine:
//! itemized shortfalls, cross-pool funding conservation, hub uniqueness,
//! upgrade instance accounting, tag gating, and determinism.

use starstead::catalog::Catalog;
use starstead::core::config::EngineConfig;
use starstead::core::types::Tier;
use starstead::engine::{Engine, InitialState, StakeSetup};
use starstead::stake::UnmetCondition;

fn engine_on(catalog: Catalog, initial: InitialState) -> Engine {
    let mut engine = Engine::new(catalog, EngineConfig::default());
    engine.start(initial).expect("start should succeed");
    engine
}

// ============================================================================
// Shortfall reporting
// ============================================================================

/// A construct costing 100 steel against 60 steel across both pools must
/// fail with a shortfall of exactly 40 and must not move any ledger.
#[test]
fn test_exact_shortfall_report_and_no_mutation() {
    let catalog = Catalog::parse_toml(
        r#"
[[resources]]
id = "steel"

[[planets]]
id = "outpost"

[[buildings]]
id = "depot-t1"
family = "depot"
tier = 1

[buildings.construction_cost]
steel = 100.0
"#,
    )
    .expect("catalog should parse");

    let initial = InitialState::new()
        .with_stake(StakeSetup::new("outpost", Tier::T1).with_resource("steel", 25.0))
        .with_stake(StakeSetup::new("outpost", Tier::T1).with_resource("steel", 35.0));
    let mut engine = engine_on(catalog, initial);
    let home = engine.stake_ids()[0];

    let failure = engine.construct("depot-t1", home).expect_err("must be short");

    assert_eq!(
        failure.conditions,
        vec![UnmetCondition::ResourceShortfall {
            resource: "steel".into(),
            required: 100.0,
            available: 60.0,
        }]
    );

    // No ledger was touched
    let snapshot = engine.snapshot();
    let total: f32 = snapshot
        .claim_stakes
        .values()
        .map(|stake| stake.resources.get("steel").copied().unwrap_or(0.0))
        .sum();
    assert!((total - 60.0).abs() < 0.001);
}

// ============================================================================
// Funding conservation
// ============================================================================

/// Local is drained first, the remainder comes from the global pool, and
/// the amounts deducted sum exactly to the construction cost.
#[test]
fn test_construct_conserves_resources_across_pools() {
    let initial = InitialState::new()
        .with_stake(
            StakeSetup::new("terrestrial", Tier::T1)
                .with_building("central-hub-t1")
                .with_resource("steel", 40.0),
        )
        .with_stake(StakeSetup::new("volcanic", Tier::T1).with_resource("steel", 100.0));
    let mut engine = engine_on(Catalog::with_defaults(), initial);

    let ids = engine.stake_ids();
    let home = ids
        .iter()
        .copied()
        .find(|id| !engine.stake(*id).unwrap().instances.is_empty())
        .expect("the hub stake is home");
    let other = ids.iter().copied().find(|id| *id != home).unwrap();

    let before = engine.global_amount("steel");
    let receipt = engine
        .construct("hydrogen-extractor-t1", home)
        .expect("cross-pool funding should succeed");

    // Home drained to zero, the other stake covered the remaining 20
    assert!((receipt.stake.resources.get("steel").copied().unwrap_or(0.0) - 0.0).abs() < 0.001);
    let other_steel = engine
        .snapshot()
        .claim_stakes
        .get(&other)
        .unwrap()
        .resources["steel"];
    assert!((other_steel - 80.0).abs() < 0.001);

    // Total deducted equals the cost exactly
    let after = engine.global_amount("steel");
    assert!((before - after - 60.0).abs() < 0.001);

    // The commit records an already-complete order
    let order = receipt.order.as_ref().expect("commit records the order");
    assert_eq!(order.building, "hydrogen-extractor-t1");
    assert_eq!(order.progress, 1.0);
    assert_eq!(receipt.stake.orders.len(), 1);
}

// ============================================================================
// Hub uniqueness
// ============================================================================

#[test]
fn test_second_hub_of_same_family_rejected() {
    let initial = InitialState::new().with_stake(
        StakeSetup::new("terrestrial", Tier::T1)
            .with_building("central-hub-t1")
            .with_resource("steel", 1000.0)
            .with_resource("fuel", 100.0),
    );
    let mut engine = engine_on(Catalog::with_defaults(), initial);
    let stake_id = engine.stake_ids()[0];

    // First power plant commits, the second violates uniqueness
    engine
        .construct("power-plant-t1", stake_id)
        .expect("first hub commits");
    let failure = engine
        .construct("power-plant-t1", stake_id)
        .expect_err("second hub must fail");

    assert!(failure
        .conditions
        .contains(&UnmetCondition::HubAlreadyPresent("power-plant".into())));

    // Only one instance of the family exists
    let stake = engine.stake(stake_id).unwrap();
    assert_eq!(stake.family_count(engine.catalog(), "power-plant"), 1);
}

// ============================================================================
// Upgrades
// ============================================================================

/// Upgrading a T1 module removes exactly one T1 instance and adds exactly
/// one T2 instance; the family's total instance count is unchanged.
#[test]
fn test_upgrade_preserves_family_instance_count() {
    let initial = InitialState::new().with_stake(
        StakeSetup::new("terrestrial", Tier::T2)
            .with_building("central-hub-t1")
            .with_building("hydrogen-extractor-t1")
            .with_building("hydrogen-extractor-t1")
            .with_resource("steel", 200.0)
            .with_resource("electronics", 20.0),
    );
    let mut engine = engine_on(Catalog::with_defaults(), initial);
    let stake_id = engine.stake_ids()[0];

    let t1_instance = engine
        .stake(stake_id)
        .unwrap()
        .instances
        .iter()
        .find(|i| i.tier == Tier::T1 && engine.catalog().building(i.definition).family == "hydrogen-extractor")
        .map(|i| i.id)
        .expect("a T1 extractor exists");

    engine
        .upgrade(t1_instance, stake_id)
        .expect("upgrade should commit");

    let stake = engine.stake(stake_id).unwrap();
    let catalog = engine.catalog();
    let t1_count = stake
        .instances
        .iter()
        .filter(|i| catalog.building(i.definition).family == "hydrogen-extractor" && i.tier == Tier::T1)
        .count();
    let t2_count = stake
        .instances
        .iter()
        .filter(|i| catalog.building(i.definition).family == "hydrogen-extractor" && i.tier == Tier::T2)
        .count();

    assert_eq!(t1_count, 1);
    assert_eq!(t2_count, 1);
    assert_eq!(stake.family_count(catalog, "hydrogen-extractor"), 2);

    // The replaced instance id is gone
    assert!(stake.instance(t1_instance).is_none());
}

#[test]
fn test_upgrade_charges_target_cost() {
    let initial = InitialState::new().with_stake(
        StakeSetup::new("terrestrial", Tier::T2)
            .with_building("central-hub-t1")
            .with_building("hydrogen-extractor-t1")
            .with_resource("steel", 150.0)
            .with_resource("electronics", 10.0),
    );
    let mut engine = engine_on(Catalog::with_defaults(), initial);
    let stake_id = engine.stake_ids()[0];
    let instance = engine.stake(stake_id).unwrap().instances[1].id;

    let receipt = engine.upgrade(instance, stake_id).expect("should commit");

    // T2 extractor costs 140 steel + 10 electronics
    assert!((receipt.stake.resources["steel"] - 10.0).abs() < 0.001);
    assert!((receipt.stake.resources.get("electronics").copied().unwrap_or(0.0)).abs() < 0.001);
}

#[test]
fn test_upgrade_blocked_by_stake_tier() {
    let initial = InitialState::new().with_stake(
        StakeSetup::new("terrestrial", Tier::T1)
            .with_building("central-hub-t1")
            .with_building("hydrogen-extractor-t1")
            .with_resource("steel", 500.0)
            .with_resource("electronics", 50.0),
    );
    let mut engine = engine_on(Catalog::with_defaults(), initial);
    let stake_id = engine.stake_ids()[0];
    let instance = engine.stake(stake_id).unwrap().instances[1].id;

    // The T2 extractor definition needs a T2 stake
    let failure = engine
        .upgrade(instance, stake_id)
        .expect_err("tier gate should reject");
    assert!(failure.conditions.iter().any(|c| matches!(
        c,
        UnmetCondition::StakeTierTooLow {
            required: Tier::T2,
            actual: Tier::T1,
        }
    )));
}

// ============================================================================
// Tag gating
// ============================================================================

#[test]
fn test_tag_gate_opens_when_prerequisite_built() {
    let initial = InitialState::new().with_stake(
        StakeSetup::new("terrestrial", Tier::T2)
            .with_building("central-hub-t1")
            .with_resource("steel", 1000.0)
            .with_resource("electronics", 100.0)
            .with_resource("fuel", 50.0),
    );
    let mut engine = engine_on(Catalog::with_defaults(), initial);
    let stake_id = engine.stake_ids()[0];

    // The refinery wants grid-power, which only the power plant grants
    let failure = engine
        .construct("steel-refinery-t1", stake_id)
        .expect_err("gated until the power plant exists");
    assert!(failure
        .conditions
        .contains(&UnmetCondition::TagLocked("grid-power".into())));

    engine
        .construct("power-plant-t1", stake_id)
        .expect("power plant commits");
    engine
        .construct("steel-refinery-t1", stake_id)
        .expect("tag gate now open");
}

// ============================================================================
// Determinism
// ============================================================================

/// Identical state and identical request always produce the same outcome.
#[test]
fn test_construction_is_deterministic() {
    let build = || {
        let initial = InitialState::new().with_stake(
            StakeSetup::new("terrestrial", Tier::T1)
                .with_building("central-hub-t1")
                .with_resource("steel", 59.9),
        );
        let mut engine = engine_on(Catalog::with_defaults(), initial);
        let stake_id = engine.stake_ids()[0];
        engine.construct("hydrogen-extractor-t1", stake_id)
    };

    let first = build();
    let second = build();

    let first_err = first.expect_err("59.9 < 60 must fail");
    let second_err = second.expect_err("59.9 < 60 must fail");
    assert_eq!(first_err.conditions, second_err.conditions);
}
