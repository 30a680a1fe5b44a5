use crate::controller::ViewEvent;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Periodic tick source behind play/pause.
///
/// At most one ticker task runs at a time. Starting a new run aborts the
/// previous one; ticks carry the run's generation so any tick already queued
/// from an aborted run can be recognised and ignored.
pub struct PlaybackTimer {
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl PlaybackTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            handle: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start ticking every interval, first tick one interval from now.
    pub fn start(&mut self, generation: u64, tx: UnboundedSender<ViewEvent>) {
        self.stop();
        let period = self.interval;
        log::debug!("playback: start generation {} every {:?}", generation, period);
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(ViewEvent::Tick { generation }).is_err() {
                    break;
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            log::debug!("playback: stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for PlaybackTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
