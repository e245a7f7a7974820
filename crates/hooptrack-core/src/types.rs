use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Session status ───────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Active,
    Complete,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "complete" => Ok(Self::Complete),
            _ => Err(CoreError::UnknownStatus(s.to_string())),
        }
    }
}

// ─── Shot events ──────────────────────────────────────────────────

/// A classified shot event. `Made` is an implicit attempt: it bumps
/// both counters, which keeps the missed count non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShotEvent {
    Made,
    Attempt,
}

// ─── Session record ───────────────────────────────────────────────

/// One session's statistics, as persisted and as served to viewers.
/// JSON field names follow the wire contract of the original rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: i64,
    pub shots_taken: u32,
    pub shots_made: u32,
    pub shots_missed: u32,
    pub streak: u32,
    pub highest_streak: u32,
    pub started_at: DateTime<Utc>,
    #[serde(rename = "timeOfSession")]
    pub time_of_session_secs: f64,
    pub status: SessionStatus,
}

impl SessionRecord {
    /// Zeroed active record for a freshly allocated session id.
    pub fn new(id: i64, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            shots_taken: 0,
            shots_made: 0,
            shots_missed: 0,
            streak: 0,
            highest_streak: 0,
            started_at,
            time_of_session_secs: 0.0,
            status: SessionStatus::Active,
        }
    }
}

// ─── Error ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    UnknownStatus(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownStatus(s) => write!(f, "unknown session status: {s}"),
        }
    }
}

impl std::error::Error for CoreError {}

// ─── Tests ────────────────────────────────────────────────────────
