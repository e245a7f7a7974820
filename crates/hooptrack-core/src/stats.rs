//! Running session statistics.
//!
//! A pure aggregate updated once per tick after classification. The
//! counters only ever grow; the streak is the one field reset, and
//! only when a new miss appears.

use chrono::{DateTime, Utc};

use crate::types::{SessionRecord, ShotEvent};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    record: SessionRecord,
    /// Miss count at the last streak reset. Starts at 0 so the very
    /// first miss of a session resets a live streak correctly.
    last_miss_count: u32,
}

impl SessionStats {
    pub fn new(id: i64, started_at: DateTime<Utc>) -> Self {
        Self {
            record: SessionRecord::new(id, started_at),
            last_miss_count: 0,
        }
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    /// Fold one tick's classified event (if any) into the aggregate.
    /// The whole update happens in memory before any persistence, so
    /// a failed store write can never leave the counters torn.
    pub fn apply(&mut self, event: Option<ShotEvent>, now: DateTime<Utc>) {
        match event {
            Some(ShotEvent::Made) => {
                self.record.shots_made += 1;
                self.record.shots_taken += 1;
            }
            Some(ShotEvent::Attempt) => {
                self.record.shots_taken += 1;
            }
            None => {}
        }

        self.record.shots_missed = self.record.shots_taken - self.record.shots_made;

        if self.record.shots_missed > self.last_miss_count {
            // A new miss since the last tick breaks the streak.
            self.record.streak = 0;
            self.last_miss_count = self.record.shots_missed;
        } else if event == Some(ShotEvent::Made) {
            self.record.streak += 1;
        }

        if self.record.streak > self.record.highest_streak {
            self.record.highest_streak = self.record.streak;
        }

        let elapsed = now - self.record.started_at;
        self.record.time_of_session_secs = elapsed.num_milliseconds().max(0) as f64 / 1000.0;
    }
}
