use crate::error::SweepError;
use jiff::Timestamp;
use portal_core::{Clock, MappingStore, SystemClock};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};
use typed_builder::TypedBuilder;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_BATCH_SIZE: usize = 512;

#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct SweeperSettings {
    /// Time between two sweeps when running in the background.
    #[builder(default = DEFAULT_INTERVAL)]
    pub interval: Duration,
    /// Codes fetched per page of the expiration scan.
    #[builder(default = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
}

impl Default for SweeperSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Purges expired mappings from a [`MappingStore`].
pub struct ExpirationSweeper<S, C = SystemClock> {
    store: Arc<S>,
    clock: C,
    settings: SweeperSettings,
}

impl<S: MappingStore> ExpirationSweeper<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: MappingStore, C: Clock> ExpirationSweeper<S, C> {
    pub fn with_clock(store: Arc<S>, clock: C) -> Self {
        Self {
            store,
            clock,
            settings: SweeperSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SweeperSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Purges every mapping whose expiration is at or before `now`.
    ///
    /// Returns how many mappings this call removed. A listed code that is
    /// gone (or was re-created as live) by the time it is purged counts as
    /// zero; a racing sweep or delete is not an error.
    pub async fn sweep_once(&self, now: Timestamp) -> Result<usize, SweepError> {
        let mut purged = 0;
        let mut cursor = None;

        loop {
            let batch = self
                .store
                .list_expired_before(now, cursor.as_ref(), self.settings.batch_size)
                .await?;

            for code in &batch.codes {
                if self.store.purge_expired(code, now).await? {
                    purged += 1;
                } else {
                    trace!(code = %code, "expired code already gone");
                }
            }

            match batch.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!(now = %now, purged, "sweep finished");
        Ok(purged)
    }

    /// Sweeps against the current time of the clock.
    pub async fn sweep(&self) -> Result<usize, SweepError> {
        self.sweep_once(self.clock.now()).await
    }

    /// Sweeps on a fixed interval until `shutdown` turns `true` or its
    /// sender is dropped. The first sweep runs immediately.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        // tokio rejects a zero period
        let period = self.settings.interval.max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval = ?period, batch_size = self.settings.batch_size, "expiration sweeper started");

        loop {
            tokio::select! {
                _ = ticker.tick() => match self.sweep().await {
                    Ok(0) => {}
                    Ok(purged) => info!(purged, "purged expired mappings"),
                    Err(err) => warn!(error = %err, "expiration sweep failed"),
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("expiration sweeper stopped");
    }

    /// Runs the sweeper as a background task.
    pub fn spawn(self) -> SweeperHandle {
        let (shutdown, receiver) = watch::channel(false);
        let task = tokio::spawn(self.run(receiver));
        SweeperHandle { shutdown, task }
    }
}

/// Handle to a sweeper started with [`ExpirationSweeper::spawn`].
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stops the sweeper and waits for its task to finish.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        self.shutdown.send_replace(true);
        self.task.await
    }
}
