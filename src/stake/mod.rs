//! Claim stake layer - ledgers, tags, rates, capacities, construction

pub mod capacity;
pub mod claim;
pub mod construction;
pub mod ledger;
pub mod rates;
pub mod tags;

pub use capacity::{CrewStats, PowerStats, StorageStats};
pub use claim::{BuildingInstance, ClaimStake, ConstructionOrder};
pub use construction::{
    validate_construct, validate_upgrade, CommandFailure, FundingPlan, UnmetCondition,
    ValidatedBuild,
};
pub use ledger::ResourceLedger;
pub use rates::{net_rates, AlwaysOperational, OperationalPolicy};
