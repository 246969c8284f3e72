//! Simulation clock - wall-clock pulses into game-time deltas
//!
//! The clock owns the running/paused flags and the speed multiplier. The
//! host pulses it with `advance(now)` on whatever cadence it likes; the
//! clock turns each pulse into a speed-scaled game-time delta. Pausing
//! clears the baseline, so resuming accrues from the resume point with no
//! retroactive catch-up for the paused span.

use std::time::Instant;

/// Tracks wall-clock progression and converts it to game seconds
#[derive(Debug, Clone)]
pub struct SimClock {
    running: bool,
    paused: bool,
    speed: f32,
    last: Option<Instant>,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            running: false,
            paused: false,
            speed: 1.0,
            last: None,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
        self.last = None;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.last = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_paused(&mut self, paused: bool) {
        if paused && !self.paused {
            // Drop the baseline so the paused span never accrues
            self.last = None;
        }
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Speed must already be validated as >= 0 by the caller
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Convert a wall-clock pulse into elapsed game seconds
    ///
    /// The first pulse after starting, resuming, or stopping establishes a
    /// baseline and yields zero.
    pub fn advance(&mut self, now: Instant) -> f32 {
        if !self.running || self.paused {
            return 0.0;
        }
        match self.last.replace(now) {
            Some(prev) => {
                let elapsed = now.saturating_duration_since(prev).as_secs_f32();
                elapsed * self.speed
            }
            None => 0.0,
        }
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_advance_establishes_baseline() {
        let mut clock = SimClock::new();
        clock.start();
        let t0 = Instant::now();
        assert_eq!(clock.advance(t0), 0.0);
    }

    #[test]
    fn test_advance_scales_by_speed() {
        let mut clock = SimClock::new();
        clock.start();
        let t0 = Instant::now();
        clock.advance(t0);

        clock.set_speed(3.0);
        let dt = clock.advance(t0 + Duration::from_secs(2));
        assert!((dt - 6.0).abs() < 0.001);
    }

    #[test]
    fn test_not_running_yields_zero() {
        let mut clock = SimClock::new();
        let t0 = Instant::now();
        assert_eq!(clock.advance(t0), 0.0);
        assert_eq!(clock.advance(t0 + Duration::from_secs(5)), 0.0);
    }

    #[test]
    fn test_paused_yields_zero() {
        let mut clock = SimClock::new();
        clock.start();
        let t0 = Instant::now();
        clock.advance(t0);

        clock.set_paused(true);
        assert_eq!(clock.advance(t0 + Duration::from_secs(1)), 0.0);
        assert_eq!(clock.advance(t0 + Duration::from_secs(2)), 0.0);
    }

    #[test]
    fn test_resume_has_no_retroactive_catchup() {
        let mut clock = SimClock::new();
        clock.start();
        let t0 = Instant::now();
        clock.advance(t0);

        clock.set_paused(true);
        clock.set_paused(false);

        // First pulse after resume only re-establishes the baseline
        let dt = clock.advance(t0 + Duration::from_secs(60));
        assert_eq!(dt, 0.0);

        // Accrual continues from the resume point
        let dt = clock.advance(t0 + Duration::from_secs(61));
        assert!((dt - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_zero_speed_freezes_game_time() {
        let mut clock = SimClock::new();
        clock.start();
        clock.set_speed(0.0);
        let t0 = Instant::now();
        clock.advance(t0);
        assert_eq!(clock.advance(t0 + Duration::from_secs(10)), 0.0);
    }
}
