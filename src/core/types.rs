//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for claim stakes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StakeId(pub Uuid);

impl StakeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StakeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for building instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl InstanceId {
    /// Create a new unique InstanceId using UUID
    pub fn new() -> Self {
        Self(Uuid::new_v4().as_u128() as u64)
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Interned resource identifier, assigned at catalog load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub u32);

/// Interned unlock-tag identifier, assigned at catalog load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagId(pub u32);

/// Interned building-definition identifier, assigned at catalog load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DefId(pub u32);

/// Interned planet-archetype identifier, assigned at catalog load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanetId(pub u32);

/// Simulation tick counter
pub type Tick = u64;

/// Accumulated game time in seconds (already speed-scaled)
pub type GameTime = f64;

/// Claim stake tier (also used for building tiers and tier gates)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tier {
    T1 = 1,
    T2 = 2,
    T3 = 3,
    T4 = 4,
    T5 = 5,
}

impl Tier {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Tier::T1),
            2 => Some(Tier::T2),
            3 => Some(Tier::T3),
            4 => Some(Tier::T4),
            5 => Some(Tier::T5),
            _ => None,
        }
    }

    /// The next tier up, if any
    pub fn next(&self) -> Option<Self> {
        Self::from_u8(self.as_u8() + 1)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T{}", self.as_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_id_unique() {
        let a = InstanceId::new();
        let b = InstanceId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_stake_id_hash() {
        use std::collections::HashMap;
        let id = StakeId::new();
        let mut map: HashMap<StakeId, &str> = HashMap::new();
        map.insert(id, "homestead");
        assert_eq!(map.get(&id), Some(&"homestead"));
    }

    #[test]
    fn test_tier_ordering() {
        assert!(Tier::T5 > Tier::T4);
        assert!(Tier::T2 > Tier::T1);
        assert_eq!(Tier::from_u8(3), Some(Tier::T3));
        assert_eq!(Tier::from_u8(0), None);
        assert_eq!(Tier::from_u8(6), None);
    }

    #[test]
    fn test_tier_next() {
        assert_eq!(Tier::T1.next(), Some(Tier::T2));
        assert_eq!(Tier::T5.next(), None);
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(Tier::T3.to_string(), "T3");
    }
}
