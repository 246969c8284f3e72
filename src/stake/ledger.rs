//! Resource ledger - per-stake resource amounts
//!
//! Amounts are plain non-negative floats keyed by interned resource id.
//! Rate application clamps at zero; storage capacity is advisory and never
//! caps the ledger.

use ahash::AHashMap;

use crate::core::types::ResourceId;

/// A claim stake's resource holdings
#[derive(Debug, Clone, Default)]
pub struct ResourceLedger {
    amounts: AHashMap<ResourceId, f32>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current amount of a resource, 0.0 when absent
    pub fn get(&self, resource: ResourceId) -> f32 {
        self.amounts.get(&resource).copied().unwrap_or(0.0)
    }

    /// Add to a resource; negative credits are ignored
    pub fn credit(&mut self, resource: ResourceId, amount: f32) {
        if amount <= 0.0 {
            return;
        }
        *self.amounts.entry(resource).or_insert(0.0) += amount;
    }

    /// Remove up to `amount`, returning what was actually removed
    pub fn debit(&mut self, resource: ResourceId, amount: f32) -> f32 {
        if amount <= 0.0 {
            return 0.0;
        }
        match self.amounts.get_mut(&resource) {
            Some(current) => {
                let removed = amount.min(*current);
                *current -= removed;
                removed
            }
            None => 0.0,
        }
    }

    /// Apply signed per-second rates over `dt` game seconds, clamping each
    /// resource at zero. Returns the largest absolute change across all
    /// resources, for change-threshold detection.
    pub fn apply_rates(&mut self, rates: &AHashMap<ResourceId, f32>, dt: f32) -> f32 {
        let mut max_delta: f32 = 0.0;
        if dt <= 0.0 {
            return max_delta;
        }
        for (resource, rate) in rates {
            let current = self.get(*resource);
            let next = (current + rate * dt).max(0.0);
            let delta = (next - current).abs();
            if delta > max_delta {
                max_delta = delta;
            }
            self.amounts.insert(*resource, next);
        }
        max_delta
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, f32)> + '_ {
        self.amounts.iter().map(|(id, amount)| (*id, *amount))
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}
