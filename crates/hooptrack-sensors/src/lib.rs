//! hooptrack-sensors: sensor IO boundary.
//! Provides the channel traits the session loop samples, a sysfs GPIO
//! backend for the physical rig, and a simulated backend for
//! development and tests. No business logic — pure IO boundary.

pub mod channel;
pub mod error;
pub mod gpio;
pub mod sim;

pub use channel::{DistanceChannel, MotionChannel, RigFactory, SensorRig};
pub use error::SensorError;
pub use gpio::GpioRigFactory;
pub use sim::{ScriptedRigFactory, SharedScript, SimRigFactory};
