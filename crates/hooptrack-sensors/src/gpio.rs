//! Linux sysfs GPIO backend: an HC-SR04 ultrasonic rim sensor plus a
//! PIR motion sensor, wired the way the original court rig was.
//!
//! Disconnected or wedged hardware surfaces as a [`SensorError`] the
//! session loop can log and skip for one tick; it never panics.

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use crate::channel::{DistanceChannel, MotionChannel, RigFactory, SensorRig};
use crate::error::SensorError;

/// Default wiring (BCM pin numbers).
pub const DEFAULT_TRIG_PIN: u8 = 23;
pub const DEFAULT_ECHO_PIN: u8 = 24;
pub const DEFAULT_MOTION_PIN: u8 = 16;

/// Speed of sound at room temperature, m/s.
const SPEED_OF_SOUND_M_S: f64 = 343.0;

/// Echo wait budget. The HC-SR04 ranges to about 4 m (~23 ms of
/// echo); anything beyond this is a disconnected or wedged sensor.
const ECHO_TIMEOUT_MS: u64 = 60;

/// One exported sysfs GPIO line.
struct SysfsPin {
    path: PathBuf,
    pin: u8,
}

impl SysfsPin {
    fn export(pin: u8, direction: &str) -> Result<Self, SensorError> {
        let base = PathBuf::from("/sys/class/gpio");
        let path = base.join(format!("gpio{pin}"));
        if !path.exists() {
            fs::write(base.join("export"), pin.to_string())?;
        }
        fs::write(path.join("direction"), direction)?;
        Ok(Self { path, pin })
    }

    fn read(&self) -> Result<u8, SensorError> {
        let raw = fs::read_to_string(self.path.join("value"))?;
        match raw.trim() {
            "0" => Ok(0),
            "1" => Ok(1),
            other => Err(SensorError::Disconnected(format!(
                "gpio{} value {other:?}",
                self.pin
            ))),
        }
    }

    fn write(&self, value: u8) -> Result<(), SensorError> {
        fs::write(self.path.join("value"), value.to_string())?;
        Ok(())
    }
}

impl Drop for SysfsPin {
    fn drop(&mut self) {
        let _ = fs::write("/sys/class/gpio/unexport", self.pin.to_string());
    }
}

/// HC-SR04: raise the trigger for 10 µs, then time how long the echo
/// line stays high. Round-trip time maps linearly to distance.
pub struct UltrasonicDistanceChannel {
    trig: SysfsPin,
    echo: SysfsPin,
}

impl UltrasonicDistanceChannel {
    pub fn open(trig_pin: u8, echo_pin: u8) -> Result<Self, SensorError> {
        Ok(Self {
            trig: SysfsPin::export(trig_pin, "out")?,
            echo: SysfsPin::export(echo_pin, "in")?,
        })
    }

    fn wait_for(&self, level: u8, deadline: Instant) -> Result<Instant, SensorError> {
        loop {
            if self.echo.read()? == level {
                return Ok(Instant::now());
            }
            if Instant::now() >= deadline {
                return Err(SensorError::ReadTimeout(ECHO_TIMEOUT_MS));
            }
        }
    }
}

impl DistanceChannel for UltrasonicDistanceChannel {
    fn sample(&mut self) -> Result<f64, SensorError> {
        self.trig.write(0)?;
        thread::sleep(Duration::from_micros(2));
        self.trig.write(1)?;
        thread::sleep(Duration::from_micros(10));
        self.trig.write(0)?;

        let deadline = Instant::now() + Duration::from_millis(ECHO_TIMEOUT_MS);
        let rise = self.wait_for(1, deadline)?;
        let fall = self.wait_for(0, deadline)?;
        let round_trip = fall.duration_since(rise).as_secs_f64();
        Ok(round_trip * SPEED_OF_SOUND_M_S / 2.0)
    }
}

/// PIR motion sensor: the value line sits high while motion is seen.
pub struct PirMotionChannel {
    pin: SysfsPin,
}

impl PirMotionChannel {
    pub fn open(pin: u8) -> Result<Self, SensorError> {
        Ok(Self {
            pin: SysfsPin::export(pin, "in")?,
        })
    }
}

impl MotionChannel for PirMotionChannel {
    fn sample(&mut self) -> Result<bool, SensorError> {
        Ok(self.pin.read()? == 1)
    }
}

/// Factory for the physical rig.
pub struct GpioRigFactory {
    pub trig_pin: u8,
    pub echo_pin: u8,
    pub motion_pin: u8,
}

impl Default for GpioRigFactory {
    fn default() -> Self {
        Self {
            trig_pin: DEFAULT_TRIG_PIN,
            echo_pin: DEFAULT_ECHO_PIN,
            motion_pin: DEFAULT_MOTION_PIN,
        }
    }
}

impl RigFactory for GpioRigFactory {
    fn build(&self) -> Result<SensorRig, SensorError> {
        Ok(SensorRig {
            distance: Box::new(UltrasonicDistanceChannel::open(
                self.trig_pin,
                self.echo_pin,
            )?),
            motion: Box::new(PirMotionChannel::open(self.motion_pin)?),
        })
    }
}
