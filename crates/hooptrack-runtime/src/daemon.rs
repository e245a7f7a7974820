//! Daemon wiring: store, sensor rig factory, controller, control server,
//! and graceful shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::TimeDelta;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use hooptrack_core::ClassifierConfig;
use hooptrack_sensors::{GpioRigFactory, RigFactory, SimRigFactory};
use hooptrack_store::Store;

use crate::cli::{default_db_path, DaemonOpts};
use crate::controller::{ControllerConfig, ControllerError, SessionController};
use crate::server::{AppState, ControlServer};

pub async fn run_daemon(opts: DaemonOpts, socket_path: &str) -> anyhow::Result<()> {
    let db_path = opts.db_path.clone().unwrap_or_else(default_db_path);
    tracing::info!(
        socket = %socket_path,
        db = %db_path,
        tick_interval_ms = opts.tick_interval_ms,
        simulate = opts.simulate,
        "starting hooptrack daemon"
    );

    let db_path = PathBuf::from(db_path);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = Arc::new(Mutex::new(Store::open(&db_path)?));

    let rigs: Arc<dyn RigFactory> = if opts.simulate {
        tracing::info!("using simulated sensor rig");
        Arc::new(SimRigFactory::default())
    } else {
        Arc::new(GpioRigFactory {
            trig_pin: opts.trig_pin,
            echo_pin: opts.echo_pin,
            motion_pin: opts.motion_pin,
        })
    };

    let config = ControllerConfig {
        tick_interval: std::time::Duration::from_millis(opts.tick_interval_ms),
        classifier: ClassifierConfig {
            distance_threshold_m: opts.distance_threshold_m,
            cooldown: TimeDelta::milliseconds(opts.cooldown_ms as i64),
        },
    };

    let state = Arc::new(AppState {
        controller: SessionController::new(Arc::clone(&store), rigs, config),
        store,
    });

    let cancel = CancellationToken::new();
    let server = ControlServer::new(socket_path, Arc::clone(&state), cancel.clone());
    let server_handle = tokio::spawn(server.run());

    wait_for_shutdown().await;
    cancel.cancel();

    // Finalize a still-running session so the record is not left active.
    match state.controller.end().await {
        Ok(id) => tracing::info!(session_id = id, "finalized session on shutdown"),
        Err(ControllerError::NoActiveSession) => {}
        Err(e) => tracing::warn!(error = %e, "failed to finalize session on shutdown"),
    }

    match server_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "server exited with error"),
        Err(e) => tracing::error!(error = %e, "server task panicked"),
    }

    // Cleanup: remove the socket file.
    let socket = PathBuf::from(socket_path);
    if socket.exists() {
        if let Err(e) = std::fs::remove_file(&socket) {
            tracing::warn!(path = %socket.display(), "failed to remove socket file: {e}");
        }
    }

    tracing::info!("hooptrack daemon stopped");
    Ok(())
}

/// Block until ctrl-c or SIGTERM.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to install SIGTERM handler");
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received ctrl-c, shutting down");
            }
            _ = sigterm.recv() => {
                tracing::info!("received SIGTERM, shutting down");
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("received ctrl-c, shutting down");
    }
}
