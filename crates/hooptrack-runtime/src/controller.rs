use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use hooptrack_core::{ClassifierConfig, SessionStats};
use hooptrack_sensors::{RigFactory, SensorError};
use hooptrack_store::{Store, StoreError};

use crate::session::run_session;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("a session is already running")]
    AlreadyRunning,
    #[error("no active session")]
    NoActiveSession,
    #[error("sensor error: {0}")]
    Sensor(#[from] SensorError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for the session loop.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// How often each sensor channel is sampled.
    pub tick_interval: std::time::Duration,
    pub classifier: ClassifierConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick_interval: std::time::Duration::from_millis(100),
            classifier: ClassifierConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionController
// ---------------------------------------------------------------------------

/// Handle to a running session loop.
struct ActiveSession {
    id: i64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns the single-flight session lifecycle: at most one session loop runs
/// at a time, and `end` does not return until the loop has fully stopped
/// and the terminal record is persisted.
pub struct SessionController {
    store: Arc<Mutex<Store>>,
    rigs: Arc<dyn RigFactory>,
    config: ControllerConfig,
    active: Mutex<Option<ActiveSession>>,
}

impl SessionController {
    pub fn new(
        store: Arc<Mutex<Store>>,
        rigs: Arc<dyn RigFactory>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            store,
            rigs,
            config,
            active: Mutex::new(None),
        }
    }

    /// Start a new session: build a sensor rig, allocate the next session id,
    /// persist the zeroed active record, and spawn the polling loop.
    ///
    /// Fails with `AlreadyRunning` if a session loop is already live, and
    /// leaves the controller idle (no record written, no task spawned) if
    /// rig construction or the initial insert fails.
    pub async fn start(&self) -> Result<i64, ControllerError> {
        let mut active = self.active.lock().await;
        if active.is_some() {
            return Err(ControllerError::AlreadyRunning);
        }

        // Build the rig before touching the store so a dead sensor does not
        // leave an orphaned active record behind.
        let rig = self.rigs.build()?;

        let started_at = Utc::now();
        let id = {
            let store = self.store.lock().await;
            let id = store.latest_session()?.map_or(0, |r| r.id) + 1;
            let stats = SessionStats::new(id, started_at);
            store.insert_session(stats.record())?;
            id
        };

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_session(
            SessionStats::new(id, started_at),
            rig,
            Arc::clone(&self.store),
            self.config.clone(),
            cancel.clone(),
        ));

        *active = Some(ActiveSession { id, cancel, handle });
        tracing::info!(session_id = id, "session started");
        Ok(id)
    }

    /// Stop the active session: cancel the loop, wait for it to drain its
    /// final tick, then mark the record complete.
    pub async fn end(&self) -> Result<i64, ControllerError> {
        let mut active = self.active.lock().await;
        let session = active.take().ok_or(ControllerError::NoActiveSession)?;

        session.cancel.cancel();
        if let Err(e) = session.handle.await {
            tracing::error!(session_id = session.id, error = %e, "session task panicked");
        }

        self.store.lock().await.mark_complete(session.id)?;
        tracing::info!(session_id = session.id, "session ended");
        Ok(session.id)
    }

    /// Id of the running session, if any.
    pub async fn active_session(&self) -> Option<i64> {
        self.active.lock().await.as_ref().map(|s| s.id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
