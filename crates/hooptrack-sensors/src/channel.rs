//! Sensor channel traits and the per-session rig.
//! Real backends and test fakes implement the same narrow traits, so
//! the session loop never knows which one it is sampling.

use crate::error::SensorError;

/// Proximity-style channel: distance from the rim sensor, in meters.
pub trait DistanceChannel: Send {
    fn sample(&mut self) -> Result<f64, SensorError>;
}

/// Motion-style channel: true while the backboard sensor sees motion.
pub trait MotionChannel: Send {
    fn sample(&mut self) -> Result<bool, SensorError>;
}

/// Both channels for one session. Built fresh at session start and
/// dropped when the session ends, releasing any hardware handles.
pub struct SensorRig {
    pub distance: Box<dyn DistanceChannel>,
    pub motion: Box<dyn MotionChannel>,
}

/// Builds a rig at session start. Enables mock injection for testing.
pub trait RigFactory: Send + Sync {
    fn build(&self) -> Result<SensorRig, SensorError>;
}
