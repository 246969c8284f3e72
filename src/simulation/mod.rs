//! Simulation layer - clock, tick orchestration, global pool

pub mod clock;
pub mod pool;
pub mod tick;

pub use clock::SimClock;
pub use pool::recompute_pool;
pub use tick::{advance_stake, run_tick, TickOutcome};
