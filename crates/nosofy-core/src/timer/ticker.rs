//! The one-second tick source.
//!
//! A `Ticker` owns at most one tokio task. Each period it sends the current
//! wall-clock instant on a channel; the receiver drives
//! [`CountdownTimer::tick_at`](super::CountdownTimer::tick_at).

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

pub struct Ticker {
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Spawn the tick task. Returns `false`, spawning nothing, if one is
    /// already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, tx: mpsc::Sender<DateTime<Utc>>) -> bool {
        if self.is_running() {
            return false;
        }
        let period = self.period;
        self.handle = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(Utc::now()).await.is_err() {
                    break;
                }
            }
        }));
        tracing::debug!(period_ms = period.as_millis() as u64, "ticker started");
        true
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("ticker stopped");
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
