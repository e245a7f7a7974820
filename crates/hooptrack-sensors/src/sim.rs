//! Simulated sensor backend: scripted feeds for tests and a
//! deterministic practice pattern for `--simulate` development runs.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::channel::{DistanceChannel, MotionChannel, RigFactory, SensorRig};
use crate::error::SensorError;

/// Shared scripted feed. Clone the handle to push readings while a
/// session loop is draining them from the other end.
#[derive(Clone)]
pub struct SharedScript<T> {
    inner: Arc<Mutex<VecDeque<Result<T, SensorError>>>>,
}

impl<T> SharedScript<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn push(&self, reading: Result<T, SensorError>) {
        self.inner.lock().expect("script lock").push_back(reading);
    }

    pub fn push_ok(&self, value: T) {
        self.push(Ok(value));
    }

    fn pop(&self) -> Option<Result<T, SensorError>> {
        self.inner.lock().expect("script lock").pop_front()
    }

    pub fn remaining(&self) -> usize {
        self.inner.lock().expect("script lock").len()
    }
}

impl<T> Default for SharedScript<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Distance channel that replays a shared script, then reports the
/// idle distance once the script runs dry.
pub struct ScriptedDistanceChannel {
    feed: SharedScript<f64>,
    idle_m: f64,
}

impl DistanceChannel for ScriptedDistanceChannel {
    fn sample(&mut self) -> Result<f64, SensorError> {
        self.feed.pop().unwrap_or(Ok(self.idle_m))
    }
}

/// Motion channel that replays a shared script, then reports no
/// motion once the script runs dry.
pub struct ScriptedMotionChannel {
    feed: SharedScript<bool>,
}

impl MotionChannel for ScriptedMotionChannel {
    fn sample(&mut self) -> Result<bool, SensorError> {
        self.feed.pop().unwrap_or(Ok(false))
    }
}

/// Factory yielding scripted channels backed by shared feeds.
pub struct ScriptedRigFactory {
    pub distance: SharedScript<f64>,
    pub motion: SharedScript<bool>,
    /// Reading reported when the distance script is empty. Keep it
    /// above the made threshold so drained scripts stay quiet.
    pub idle_m: f64,
}

impl Default for ScriptedRigFactory {
    fn default() -> Self {
        Self {
            distance: SharedScript::new(),
            motion: SharedScript::new(),
            idle_m: 0.8,
        }
    }
}

impl RigFactory for ScriptedRigFactory {
    fn build(&self) -> Result<SensorRig, SensorError> {
        Ok(SensorRig {
            distance: Box::new(ScriptedDistanceChannel {
                feed: self.distance.clone(),
                idle_m: self.idle_m,
            }),
            motion: Box::new(ScriptedMotionChannel {
                feed: self.motion.clone(),
            }),
        })
    }
}

/// Distance channel cycling a fixed practice pattern: one near-rim
/// reading every `made_every` samples, idle otherwise.
pub struct PatternDistanceChannel {
    n: u64,
    made_every: u64,
}

impl DistanceChannel for PatternDistanceChannel {
    fn sample(&mut self) -> Result<f64, SensorError> {
        self.n += 1;
        if self.n % self.made_every == 0 {
            Ok(0.2)
        } else {
            Ok(0.8)
        }
    }
}

/// Motion channel reporting a detection every `motion_every` samples.
pub struct PatternMotionChannel {
    n: u64,
    motion_every: u64,
}

impl MotionChannel for PatternMotionChannel {
    fn sample(&mut self) -> Result<bool, SensorError> {
        self.n += 1;
        Ok(self.n % self.motion_every == 0)
    }
}

/// Deterministic practice pattern for daemon runs without hardware.
pub struct SimRigFactory {
    pub made_every: u64,
    pub motion_every: u64,
}

impl Default for SimRigFactory {
    fn default() -> Self {
        // At a 100 ms tick with a 2 s cooldown this lands a few shot
        // events per minute, enough to watch live stats move.
        Self {
            made_every: 50,
            motion_every: 30,
        }
    }
}

impl RigFactory for SimRigFactory {
    fn build(&self) -> Result<SensorRig, SensorError> {
        Ok(SensorRig {
            distance: Box::new(PatternDistanceChannel {
                n: 0,
                made_every: self.made_every,
            }),
            motion: Box::new(PatternMotionChannel {
                n: 0,
                motion_every: self.motion_every,
            }),
        })
    }
}
