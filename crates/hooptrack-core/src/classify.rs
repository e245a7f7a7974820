//! Shot classification: debounced channel readings → domain events.
//!
//! Two independent rules, each gated by its own debounce channel:
//!
//! - **Made**: the rim distance reading is below half the configured
//!   threshold (ball passing through or settling in the net).
//! - **Attempt**: the motion channel reports a detection and no Made
//!   was registered for the same tick.
//!
//! A made shot is itself an attempt, so at most one event is emitted
//! per tick and `shotsMade` can never outrun `shotsTaken`.

use chrono::{DateTime, TimeDelta, Utc};

use crate::debounce::{DEFAULT_COOLDOWN_SECS, Debounce};
use crate::types::ShotEvent;

/// Rim distance threshold (meters). A reading below half this value
/// counts as a made shot. Matches the court-side calibration of the
/// original rig.
pub const DEFAULT_DISTANCE_THRESHOLD_M: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierConfig {
    pub distance_threshold_m: f64,
    pub cooldown: TimeDelta,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            distance_threshold_m: DEFAULT_DISTANCE_THRESHOLD_M,
            cooldown: TimeDelta::seconds(DEFAULT_COOLDOWN_SECS),
        }
    }
}

/// One tick's worth of raw channel readings. `None` marks a channel
/// whose sample failed this tick; it contributes no event.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickSample {
    /// Rim proximity reading, meters.
    pub distance_m: Option<f64>,
    /// Motion detection flag.
    pub motion: Option<bool>,
}

#[derive(Debug)]
pub struct ShotClassifier {
    distance_threshold_m: f64,
    rim: Debounce,
    motion: Debounce,
}

impl ShotClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            distance_threshold_m: config.distance_threshold_m,
            rim: Debounce::new(config.cooldown),
            motion: Debounce::new(config.cooldown),
        }
    }

    /// Classify one tick of readings.
    pub fn classify(&mut self, sample: TickSample, now: DateTime<Utc>) -> Option<ShotEvent> {
        let made = sample
            .distance_m
            .is_some_and(|d| d < self.distance_threshold_m / 2.0)
            && self.rim.try_fire(now);

        let motion_positive = sample.motion == Some(true);

        if made {
            // The motion burst belongs to the same physical event
            // window; consume its debounce so the next tick cannot
            // turn it into a trailing attempt.
            if motion_positive {
                self.motion.try_fire(now);
            }
            return Some(ShotEvent::Made);
        }

        if motion_positive && self.motion.try_fire(now) {
            return Some(ShotEvent::Attempt);
        }

        None
    }
}

impl Default for ShotClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).expect("valid timestamp")
    }

    fn distance(d: f64) -> TickSample {
        TickSample {
            distance_m: Some(d),
            motion: Some(false),
        }
    }

    fn motion() -> TickSample {
        TickSample {
            distance_m: Some(0.8),
            motion: Some(true),
        }
    }

    #[test]
    fn near_rim_reading_classifies_as_made() {
        let mut c = ShotClassifier::default();
        assert_eq!(c.classify(distance(0.2), at(0)), Some(ShotEvent::Made));
    }

    #[test]
    fn far_reading_is_no_event() {
        let mut c = ShotClassifier::default();
        assert_eq!(c.classify(distance(0.6), at(0)), None);
    }

    #[test]
    fn threshold_boundary_is_exclusive() {
        let mut c = ShotClassifier::default();
        // Exactly threshold/2 does not count; strictly below does.
        assert_eq!(c.classify(distance(0.25), at(0)), None);
        assert_eq!(c.classify(distance(0.249), at(1)), Some(ShotEvent::Made));
    }

    #[test]
    fn ball_settling_near_rim_counts_once() {
        let mut c = ShotClassifier::default();
        assert_eq!(c.classify(distance(0.2), at(0)), Some(ShotEvent::Made));
        assert_eq!(c.classify(distance(0.2), at(1)), None);
        assert_eq!(c.classify(distance(0.2), at(2)), None);
        // Re-armed after the cooldown.
        assert_eq!(c.classify(distance(0.2), at(3)), Some(ShotEvent::Made));
    }

    #[test]
    fn motion_classifies_as_attempt() {
        let mut c = ShotClassifier::default();
        assert_eq!(c.classify(motion(), at(0)), Some(ShotEvent::Attempt));
    }

    #[test]
    fn sustained_motion_counts_once() {
        let mut c = ShotClassifier::default();
        assert_eq!(c.classify(motion(), at(0)), Some(ShotEvent::Attempt));
        assert_eq!(c.classify(motion(), at(1)), None);
        assert_eq!(c.classify(motion(), at(3)), Some(ShotEvent::Attempt));
    }

    #[test]
    fn made_suppresses_attempt_in_same_tick() {
        let mut c = ShotClassifier::default();
        let both = TickSample {
            distance_m: Some(0.1),
            motion: Some(true),
        };
        assert_eq!(c.classify(both, at(0)), Some(ShotEvent::Made));
        // The motion window was consumed with the made shot, so the
        // tail of the same burst cannot register a trailing attempt.
        assert_eq!(c.classify(motion(), at(1)), None);
    }

    #[test]
    fn failed_channels_contribute_nothing() {
        let mut c = ShotClassifier::default();
        assert_eq!(c.classify(TickSample::default(), at(0)), None);
        let motion_only = TickSample {
            distance_m: None,
            motion: Some(true),
        };
        // The healthy channel still classifies.
        assert_eq!(c.classify(motion_only, at(0)), Some(ShotEvent::Attempt));
    }

    #[test]
    fn rim_and_motion_debounce_independently() {
        let mut c = ShotClassifier::default();
        assert_eq!(c.classify(distance(0.2), at(0)), Some(ShotEvent::Made));
        // Motion alone one second later: its own channel is fresh.
        assert_eq!(c.classify(motion(), at(1)), Some(ShotEvent::Attempt));
    }
}
