use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Full calendar re-fetch period.
pub const CALENDAR_REFRESH: Duration = Duration::from_secs(180 * 60);
/// Past/now/future reclassification period.
pub const CALENDAR_STATUS: Duration = Duration::from_secs(60);
/// Weather state re-read period.
pub const WEATHER_REFRESH: Duration = Duration::from_secs(60);

/// A periodic timer running on a background Tokio task.
///
/// The task stops when the `Ticker` is dropped (or [`Ticker::stop`] is
/// called), so scoping a `Ticker` to its consumer is all the teardown needed.
#[derive(Debug)]
pub struct Ticker {
    rx:   mpsc::Receiver<Instant>,
    task: JoinHandle<()>,
}

/// Spawn a [`Ticker`] firing every `period`.
///
/// With `immediate = true` the first tick fires right away, otherwise after
/// one full period.  Ticks are not queued up: a slow consumer sees at most
/// one pending tick.
pub fn spawn_ticker(period: Duration, immediate: bool) -> Ticker {
    let (tx, rx) = mpsc::channel(1);

    let task = tokio::spawn(async move {
        let first = if immediate {
            Instant::now()
        } else {
            Instant::now() + period
        };
        let mut interval = time::interval_at(first, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let at = interval.tick().await;
            if tx.send(at).await.is_err() {
                break; // receiver dropped
            }
        }
    });

    Ticker { rx, task }
}

impl Ticker {
    /// Wait for the next tick.  Returns `None` once the timer task has ended.
    pub async fn tick(&mut self) -> Option<Instant> {
        self.rx.recv().await
    }

    /// Stop the timer explicitly.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn immediate_ticker_fires_at_once_then_every_period() {
        let start = Instant::now();
        let mut ticker = spawn_ticker(Duration::from_secs(60), true);

        let first = ticker.tick().await.unwrap();
        assert_eq!(first, start);

        let second = ticker.tick().await.unwrap();
        assert_eq!(second - start, Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_ticker_waits_one_period() {
        let mut ticker = spawn_ticker(Duration::from_secs(60), false);

        let early = time::timeout(Duration::from_secs(59), ticker.tick()).await;
        assert!(early.is_err());

        assert!(ticker.tick().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_ticker_stops_its_task() {
        let ticker = spawn_ticker(Duration::from_secs(1), true);
        let handle = ticker.task.abort_handle();

        ticker.stop();
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }

        assert!(handle.is_finished());
    }
}
