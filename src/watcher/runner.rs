use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::watcher::{InFlight, Notification, UpdateWatcher};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Parse an interval like "500ms", "5s", "30m", "1h" or "1d". A bare number is
/// seconds. Zero is rejected.
pub fn parse_interval(s: &str) -> Result<Duration, String> {
    let s = s.trim().to_lowercase();

    let (number, unit_secs) = if let Some(millis) = s.strip_suffix("ms") {
        let millis = millis
            .parse::<u64>()
            .map_err(|_| format!("Invalid milliseconds: {}", millis))?;
        return positive(Duration::from_millis(millis), &s);
    } else if let Some(hours) = s.strip_suffix('h') {
        (hours.parse::<u64>().map_err(|_| format!("Invalid hours: {}", hours))?, 3600)
    } else if let Some(minutes) = s.strip_suffix('m') {
        (minutes.parse::<u64>().map_err(|_| format!("Invalid minutes: {}", minutes))?, 60)
    } else if let Some(days) = s.strip_suffix('d') {
        (days.parse::<u64>().map_err(|_| format!("Invalid days: {}", days))?, 86400)
    } else if let Some(secs) = s.strip_suffix('s') {
        (secs.parse::<u64>().map_err(|_| format!("Invalid seconds: {}", secs))?, 1)
    } else {
        let secs = s
            .parse::<u64>()
            .map_err(|_| format!("Invalid interval: {}. Use format like '5s', '30m', '1h'", s))?;
        (secs, 1)
    };

    let secs = number
        .checked_mul(unit_secs)
        .ok_or_else(|| format!("Interval too large: {}", s))?;
    positive(Duration::from_secs(secs), &s)
}

fn positive(duration: Duration, s: &str) -> Result<Duration, String> {
    if duration.is_zero() {
        return Err(format!("Interval must be positive: {}", s));
    }
    Ok(duration)
}

pub fn format_interval(duration: Duration) -> String {
    let secs = duration.as_secs();
    if duration.subsec_millis() != 0 || secs == 0 {
        format!("{}ms", duration.as_millis())
    } else if secs >= 86400 && secs.is_multiple_of(86400) {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 && secs.is_multiple_of(3600) {
        format!("{}h", secs / 3600)
    } else if secs >= 60 && secs.is_multiple_of(60) {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

/// Handle to a running watcher task. Dropping it stops the task.
pub struct WatcherHandle {
    task: JoinHandle<()>,
    in_flight: InFlight,
}

impl WatcherHandle {
    /// True while a check is outstanding.
    pub fn is_checking(&self) -> bool {
        self.in_flight.is_busy()
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Poll `watcher` every `every` and send each notification to `tx`.
///
/// Each check runs in its own task. A tick that lands while a check is still
/// running is dropped. The loop ends when the receiver goes away.
pub fn spawn_update_watcher(
    watcher: Arc<Mutex<UpdateWatcher>>,
    every: Duration,
    tx: mpsc::UnboundedSender<Notification>,
) -> WatcherHandle {
    let in_flight = InFlight::new();
    let guard = in_flight.clone();
    let every = every.max(Duration::from_millis(1));

    let task = tokio::spawn(async move {
        info!("Update watcher started (every {})", format_interval(every));

        let mut timer = interval(every);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        timer.tick().await; // Skip the first immediate tick

        loop {
            timer.tick().await;

            if tx.is_closed() {
                break;
            }

            let Some(ticket) = guard.try_begin() else {
                debug!("Previous update check still running, tick dropped");
                continue;
            };

            let watcher = watcher.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let _ticket = ticket;
                let notification = watcher.lock().await.check(Instant::now()).await;
                if let Some(notification) = notification {
                    let _ = tx.send(notification);
                }
            });
        }

        info!("Update watcher stopped");
    });

    WatcherHandle { task, in_flight }
}
