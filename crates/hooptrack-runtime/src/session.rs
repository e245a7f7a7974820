//! The per-session polling loop: sample both channels, classify, fold
//! into stats, persist. One `run_session` task exists per active session.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use hooptrack_core::{SessionStats, ShotClassifier, TickSample};
use hooptrack_sensors::SensorRig;
use hooptrack_store::Store;

use crate::controller::ControllerConfig;

/// Drive the session loop at a fixed tick until cancelled.
///
/// Every failure inside a tick is logged and absorbed; the loop only
/// stops when the controller cancels it.
pub(crate) async fn run_session(
    mut stats: SessionStats,
    mut rig: SensorRig,
    store: Arc<Mutex<Store>>,
    config: ControllerConfig,
    cancel: CancellationToken,
) {
    let mut classifier = ShotClassifier::new(config.classifier);
    let mut ticker = tokio::time::interval(config.tick_interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        session_tick(&mut stats, &mut classifier, &mut rig, &store).await;
    }

    tracing::debug!(session_id = stats.record().id, "session loop stopped");
}

/// One polling tick: a failed channel read degrades to a quiet reading
/// for that channel, and a failed progress write is retried implicitly
/// by the next tick's cumulative write.
async fn session_tick(
    stats: &mut SessionStats,
    classifier: &mut ShotClassifier,
    rig: &mut SensorRig,
    store: &Arc<Mutex<Store>>,
) {
    let now = Utc::now();

    let distance_m = match rig.distance.sample() {
        Ok(d) => Some(d),
        Err(e) => {
            tracing::warn!(error = %e, "distance read failed, skipping channel this tick");
            None
        }
    };
    let motion = match rig.motion.sample() {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::warn!(error = %e, "motion read failed, skipping channel this tick");
            None
        }
    };

    let event = classifier.classify(TickSample { distance_m, motion }, now);
    if let Some(event) = event {
        tracing::debug!(session_id = stats.record().id, ?event, "shot event");
    }
    stats.apply(event, now);

    if let Err(e) = store.lock().await.update_progress(stats.record()) {
        tracing::warn!(
            session_id = stats.record().id,
            error = %e,
            "progress write failed, retrying next tick"
        );
    }
}
