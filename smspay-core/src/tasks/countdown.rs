// src/tasks/countdown.rs

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant, MissedTickBehavior};

/// Spawns a countdown of `duration` that posts `on_tick(time_left)` roughly every
/// `tick`, then `on_finish()` once the deadline has passed.
///
/// The task stops quietly if the receiving side is gone; abort the handle to
/// stop it early.
pub fn spawn_countdown<T, F, G>(
    duration: Duration,
    tick: Duration,
    tx: UnboundedSender<T>,
    on_tick: F,
    on_finish: G,
) -> JoinHandle<()>
where
    T: Send + 'static,
    F: Fn(Duration) -> T + Send + 'static,
    G: FnOnce() -> T + Send + 'static,
{
    tokio::spawn(async move {
        let deadline = Instant::now() + duration;
        let mut ticker = tokio::time::interval(tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = sleep_until(deadline) => break,
                _ = ticker.tick() => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    if tx.send(on_tick(left)).is_err() {
                        return;
                    }
                }
            }
        }
        let _ = tx.send(on_finish());
    })
}

/// Spawns a one-shot timer that posts `message` after `delay`.
pub fn spawn_after<T>(delay: Duration, tx: UnboundedSender<T>, message: T) -> JoinHandle<()>
where
    T: Send + 'static,
{
    tokio::spawn(async move {
        sleep(delay).await;
        let _ = tx.send(message);
    })
}
