use crate::store::{AnnotationStore, FlushOutcome};
use log::{error, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(30);
pub const MIN_FLUSH_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy)]
pub struct FlushConfig {
    pub interval: Duration,
}

impl Default for FlushConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_FLUSH_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FlushHealth {
    pub last_success: Option<SystemTime>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
    pub writes: u64,
    pub running: bool,
}

/// Background task that persists the store on a fixed interval when dirty.
///
/// Stops on [`FlushScheduler::shutdown`] (or when the scheduler is dropped),
/// running one final flush before exiting.
pub struct FlushScheduler {
    shutdown_tx: oneshot::Sender<()>,
    health_rx: watch::Receiver<FlushHealth>,
    handle: JoinHandle<()>,
}

impl FlushScheduler {
    /// Must be called from within a tokio runtime. A zero interval is raised
    /// to [`MIN_FLUSH_INTERVAL`].
    pub fn start(store: Arc<AnnotationStore>, path: PathBuf, config: FlushConfig) -> Self {
        let interval = if config.interval < MIN_FLUSH_INTERVAL {
            warn!(
                "Flush interval {:?} is below {:?}; using the minimum",
                config.interval, MIN_FLUSH_INTERVAL
            );
            MIN_FLUSH_INTERVAL
        } else {
            config.interval
        };

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (health_tx, health_rx) = watch::channel(FlushHealth {
            running: true,
            ..FlushHealth::default()
        });

        let handle = spawn_flush_loop(store, path, interval, shutdown_rx, health_tx);

        Self {
            shutdown_tx,
            health_rx,
            handle,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FlushHealth> {
        self.health_rx.clone()
    }

    /// Stop the loop, flush one last time, and wait for the task to finish.
    pub async fn shutdown(self) -> FlushHealth {
        let _ = self.shutdown_tx.send(());
        if let Err(err) = self.handle.await {
            error!("Flush task ended abnormally: {err}");
        }
        let health = self.health_rx.borrow().clone();
        health
    }
}

fn spawn_flush_loop(
    store: Arc<AnnotationStore>,
    path: PathBuf,
    interval: Duration,
    mut shutdown_rx: oneshot::Receiver<()>,
    health_tx: watch::Sender<FlushHealth>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut health = health_tx.borrow().clone();
        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    run_flush_cycle(&store, &path, &mut health, &health_tx).await;
                }
                // Either an explicit shutdown or the scheduler was dropped.
                _ = &mut shutdown_rx => break,
            }
        }

        run_flush_cycle(&store, &path, &mut health, &health_tx).await;
        health.running = false;
        let _ = health_tx.send(health);
        info!("Annotation flush task stopped");
    })
}

async fn run_flush_cycle(
    store: &AnnotationStore,
    path: &Path,
    health: &mut FlushHealth,
    health_tx: &watch::Sender<FlushHealth>,
) {
    match store.flush(path).await {
        Ok(FlushOutcome::Skipped) => {}
        Ok(FlushOutcome::Written { .. }) => {
            health.last_success = Some(SystemTime::now());
            health.last_error = None;
            health.consecutive_failures = 0;
            health.writes += 1;
            let _ = health_tx.send(health.clone());
        }
        Err(err) => {
            error!("Failed to save annotations to {}: {err}", path.display());
            health.last_error = Some(err.to_string());
            health.consecutive_failures += 1;
            if health.consecutive_failures > 1 {
                warn!(
                    "Annotation save has failed {} times in a row; changes remain in memory",
                    health.consecutive_failures
                );
            }
            let _ = health_tx.send(health.clone());
        }
    }
}
