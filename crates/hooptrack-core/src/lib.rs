//! hooptrack-core: session-monitoring domain logic.
//! Sensor debouncing, shot classification, and statistics bookkeeping
//! as pure, side-effect-free modules. No I/O.

pub mod classify;
pub mod debounce;
pub mod stats;
pub mod types;

pub use classify::{ClassifierConfig, ShotClassifier, TickSample};
pub use debounce::Debounce;
pub use stats::SessionStats;
pub use types::{SessionRecord, SessionStatus, ShotEvent};
