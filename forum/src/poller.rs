//! Fixed-interval refresh timers.
//!
//! Each timer is a spawned task feeding [`Tick`]s into a channel. Dropping
//! the [`RefreshTimer`] aborts the task, so a view that goes away stops
//! refreshing.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// Default period between background refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Which view a tick is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Threads,
    Posts,
}

/// Handle to a running timer task.
#[derive(Debug)]
pub struct RefreshTimer {
    tick: Tick,
    handle: JoinHandle<()>,
}

impl RefreshTimer {
    /// Send `tick` on `tx` every `period`, starting one period from now.
    ///
    /// The task ends on its own once the receiver is gone.
    pub fn spawn(period: Duration, tick: Tick, tx: mpsc::Sender<Tick>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                if tx.send(tick).await.is_err() {
                    break;
                }
            }
        });

        debug!(?tick, ?period, "refresh timer started");
        Self { tick, handle }
    }

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        debug!(tick = ?self.tick, "refresh timer stopped");
        self.handle.abort();
    }
}
