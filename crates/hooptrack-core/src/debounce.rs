//! Per-channel re-arm timer.
//!
//! A single physical event (a ball settling near the rim, sustained
//! motion in front of the backboard) holds a sensor positive across
//! many polling ticks. The debounce window collapses that into one
//! discrete firing per channel; each channel re-arms independently.

use chrono::{DateTime, TimeDelta, Utc};

/// Default re-arm window between firings on one channel (seconds).
pub const DEFAULT_COOLDOWN_SECS: i64 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debounce {
    cooldown: TimeDelta,
    last_fired_at: Option<DateTime<Utc>>,
}

impl Debounce {
    pub fn new(cooldown: TimeDelta) -> Self {
        Self {
            cooldown,
            last_fired_at: None,
        }
    }

    /// True when the channel may fire at `now`: never fired, or the
    /// cooldown has fully elapsed since the last firing.
    pub fn eligible(&self, now: DateTime<Utc>) -> bool {
        match self.last_fired_at {
            None => true,
            Some(last) => now - last > self.cooldown,
        }
    }

    /// Consume an eligible window. Call only on a positive physical
    /// reading: records the firing and returns true, or returns false
    /// and the reading is discarded.
    pub fn try_fire(&mut self, now: DateTime<Utc>) -> bool {
        if self.eligible(now) {
            self.last_fired_at = Some(now);
            true
        } else {
            false
        }
    }
}

impl Default for Debounce {
    fn default() -> Self {
        Self::new(TimeDelta::seconds(DEFAULT_COOLDOWN_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).expect("valid timestamp")
    }

    #[test]
    fn first_reading_fires() {
        let mut d = Debounce::default();
        assert!(d.try_fire(at(0)));
    }

    #[test]
    fn reading_within_cooldown_is_suppressed() {
        let mut d = Debounce::default();
        assert!(d.try_fire(at(0)));
        assert!(!d.try_fire(at(1)));
        // Boundary: exactly the cooldown is still inside the window.
        assert!(!d.try_fire(at(2)));
    }

    #[test]
    fn rearms_after_cooldown_elapses() {
        let mut d = Debounce::default();
        assert!(d.try_fire(at(0)));
        assert!(d.try_fire(at(3)));
        assert!(!d.try_fire(at(4)));
    }

    #[test]
    fn suppressed_reading_does_not_extend_window() {
        let mut d = Debounce::default();
        assert!(d.try_fire(at(0)));
        assert!(!d.try_fire(at(1)));
        // Window is measured from the firing at t=0, not the
        // suppressed reading at t=1.
        assert!(d.try_fire(at(3)));
    }

    #[test]
    fn channels_are_independent() {
        let mut rim = Debounce::default();
        let mut motion = Debounce::default();
        assert!(rim.try_fire(at(0)));
        // The rim firing does not consume the motion channel's window.
        assert!(motion.try_fire(at(0)));
        assert!(!rim.try_fire(at(1)));
        assert!(!motion.try_fire(at(1)));
    }

    #[test]
    fn custom_cooldown_respected() {
        let mut d = Debounce::new(TimeDelta::milliseconds(50));
        assert!(d.try_fire(at(0)));
        assert!(d.try_fire(at(1)));
    }
}
