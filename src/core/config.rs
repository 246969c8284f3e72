//! Engine configuration with documented constants
//!
//! The tuning knobs of the simulation loop are collected here with
//! explanations of their purpose and how they interact.

use std::time::Duration;

/// Configuration for the simulation engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Advisory cadence at which the host should pulse the clock
    ///
    /// The engine itself is host-driven and accepts any interval; this is
    /// the rate the bundled binaries use between `tick_at` calls. Shorter
    /// intervals give smoother ledger movement at the cost of more wakeups.
    pub tick_interval: Duration,

    /// Minimum ledger movement that counts as an observable change
    ///
    /// A tick only notifies subscribers when some resource amount moved by
    /// more than this threshold. This suppresses notification storms caused
    /// by sub-threshold floating-point drift at high tick rates.
    pub change_epsilon: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            change_epsilon: 0.001,
        }
    }
}
