//! Time bookkeeping
//!
//! Two clocks drive the simulation:
//! - [`Timestamp`]: wall-clock milliseconds captured at activation. Cooldowns,
//!   reloads and power-ups compare against the caller's current time, so a
//!   frame hitch does not stretch them.
//! - [`Countdown`]: seconds decremented by the (clamped) frame delta. Wave
//!   transition timers pace with simulated time.

use serde::{Deserialize, Serialize};

/// Wall-clock instant in milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Timestamp(pub f64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0.0);

    pub fn from_millis(ms: f64) -> Self {
        Self(ms)
    }

    pub fn millis(self) -> f64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`
    #[inline]
    pub fn since(self, earlier: Timestamp) -> f64 {
        self.0 - earlier.0
    }

    /// This instant shifted forward by `ms`
    #[inline]
    pub fn after(self, ms: f64) -> Timestamp {
        Timestamp(self.0 + ms)
    }
}

/// True when no action was recorded yet or at least `cooldown_ms` has passed
#[inline]
pub fn cooldown_elapsed(last: Option<Timestamp>, now: Timestamp, cooldown_ms: f64) -> bool {
    match last {
        Some(t) => now.since(t) >= cooldown_ms,
        None => true,
    }
}

/// Countdown in seconds, advanced by the frame delta
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Countdown(f32);

impl Countdown {
    pub fn new(seconds: f32) -> Self {
        Self(seconds)
    }

    pub fn idle() -> Self {
        Self(0.0)
    }

    pub fn is_running(&self) -> bool {
        self.0 > 0.0
    }

    /// Remaining seconds (never negative)
    pub fn remaining(&self) -> f32 {
        self.0.max(0.0)
    }

    pub fn stop(&mut self) {
        self.0 = 0.0;
    }

    /// Advance by `dt`; returns true on the frame the countdown runs out
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.0 > 0.0 {
            self.0 -= dt;
            self.0 <= 0.0
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_never_used_is_ready() {
        assert!(cooldown_elapsed(None, Timestamp::ZERO, 500.0));
    }

    #[test]
    fn test_cooldown_boundary() {
        let last = Some(Timestamp(1000.0));
        assert!(!cooldown_elapsed(last, Timestamp(1499.0), 500.0));
        assert!(cooldown_elapsed(last, Timestamp(1500.0), 500.0));
    }

    #[test]
    fn test_countdown_fires_once() {
        let mut c = Countdown::new(0.05);
        assert!(!c.tick(0.03));
        assert!(c.tick(0.03));
        assert!(!c.is_running());
        assert!(!c.tick(0.03));
        assert_eq!(c.remaining(), 0.0);
    }
}
