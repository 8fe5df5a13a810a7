//! Background polling for new upstream content.
//!
//! [`UpdateWatcher`] compares the head of a change source against the last
//! head it saw and raises a [`Notification`] when it moved, at most once per
//! cooldown. [`runner`] drives it from a timer.

pub mod guard;
pub mod runner;

pub use guard::{InFlight, InFlightTicket, Throttle};
pub use runner::{format_interval, parse_interval, spawn_update_watcher, WatcherHandle};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Deserializer};

use crate::app::Result;
use crate::domain::{FeedKind, ItemId};
use crate::fetcher::ItemFetcher;

pub const UPDATE_MESSAGE: &str = "New updates available!";
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30);

/// Where the watcher reads its head id from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchSource {
    /// `items[0]` of `/updates.json`.
    #[default]
    Updates,
    /// First id of a story feed.
    Feed(FeedKind),
}

impl fmt::Display for WatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchSource::Updates => f.write_str("updates"),
            WatchSource::Feed(feed) => write!(f, "{}", feed),
        }
    }
}

impl FromStr for WatchSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("updates") {
            Ok(WatchSource::Updates)
        } else {
            s.parse::<FeedKind>().map(WatchSource::Feed)
        }
    }
}

impl<'de> Deserialize<'de> for WatchSource {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Last observed head and when the user was last told about a change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub head: Option<ItemId>,
    pub last_notified: Option<Instant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub head: ItemId,
    pub message: String,
}

pub struct UpdateWatcher {
    items: Arc<ItemFetcher>,
    source: WatchSource,
    cooldown: Duration,
    cursor: Cursor,
}

impl UpdateWatcher {
    pub fn new(items: Arc<ItemFetcher>, source: WatchSource, cooldown: Duration) -> Self {
        Self {
            items,
            source,
            cooldown,
            cursor: Cursor::default(),
        }
    }

    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn source(&self) -> WatchSource {
        self.source
    }

    /// Decide whether `head` is news. The first head ever seen only seeds the
    /// cursor. A change inside the cooldown is not recorded, so it is reported
    /// on a later observation once the cooldown has passed.
    pub fn observe(&mut self, head: Option<ItemId>, now: Instant) -> Option<Notification> {
        let head = head?;

        let Some(previous) = self.cursor.head else {
            tracing::debug!("Watcher seeded at {}", head);
            self.cursor.head = Some(head);
            return None;
        };

        if previous == head {
            return None;
        }

        let cooled_down = match self.cursor.last_notified {
            None => true,
            Some(at) => now.saturating_duration_since(at) >= self.cooldown,
        };
        if !cooled_down {
            tracing::debug!("Head moved to {} inside cooldown", head);
            return None;
        }

        self.cursor = Cursor {
            head: Some(head),
            last_notified: Some(now),
        };
        tracing::info!("Head moved from {} to {}", previous, head);

        Some(Notification {
            head,
            message: UPDATE_MESSAGE.to_string(),
        })
    }

    pub async fn fetch_head(&self) -> Result<Option<ItemId>> {
        match self.source {
            WatchSource::Updates => Ok(self.items.fetch_updates().await?.head()),
            WatchSource::Feed(feed) => Ok(self.items.fetch_feed_ids(feed).await?.first().copied()),
        }
    }

    /// One poll cycle. Fetch errors are logged and otherwise ignored; the next
    /// cycle tries again.
    pub async fn check(&mut self, now: Instant) -> Option<Notification> {
        match self.fetch_head().await {
            Ok(head) => self.observe(head, now),
            Err(e) => {
                tracing::warn!("Update check against {} failed: {}", self.source, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::testing::StubFetcher;

    fn watcher(stub: Arc<StubFetcher>, source: WatchSource) -> UpdateWatcher {
        UpdateWatcher::new(Arc::new(ItemFetcher::new(stub)), source, DEFAULT_COOLDOWN)
    }

    fn offline() -> UpdateWatcher {
        watcher(Arc::new(StubFetcher::new()), WatchSource::Updates)
    }

    #[test]
    fn test_unchanged_head_then_one_notification() {
        let start = Instant::now();
        let mut watcher = offline().with_cursor(Cursor {
            head: Some(100),
            last_notified: Some(start),
        });
        let later = start + DEFAULT_COOLDOWN;

        assert!(watcher.observe(Some(100), later).is_none());
        assert!(watcher.observe(Some(100), later).is_none());

        let notification = watcher.observe(Some(101), later).unwrap();
        assert_eq!(notification.head, 101);
        assert_eq!(notification.message, "New updates available!");
        assert_eq!(watcher.cursor().head, Some(101));
        assert_eq!(watcher.cursor().last_notified, Some(later));

        assert!(watcher.observe(Some(101), later).is_none());
    }

    #[test]
    fn test_first_observation_seeds_silently() {
        let mut watcher = offline();
        assert!(watcher.observe(Some(5), Instant::now()).is_none());
        assert_eq!(watcher.cursor().head, Some(5));
        assert!(watcher.cursor().last_notified.is_none());
    }

    #[test]
    fn test_first_change_notifies_without_waiting() {
        let now = Instant::now();
        let mut watcher = offline();
        watcher.observe(Some(5), now);
        assert!(watcher.observe(Some(6), now).is_some());
    }

    #[test]
    fn test_change_inside_cooldown_is_held_back() {
        let start = Instant::now();
        let mut watcher = offline().with_cursor(Cursor {
            head: Some(100),
            last_notified: Some(start),
        });

        assert!(watcher.observe(Some(101), start + Duration::from_secs(1)).is_none());
        assert_eq!(watcher.cursor().head, Some(100));

        let later = start + DEFAULT_COOLDOWN + Duration::from_secs(1);
        assert_eq!(watcher.observe(Some(102), later).map(|n| n.head), Some(102));
    }

    #[test]
    fn test_empty_source_is_ignored() {
        let mut watcher = offline();
        assert!(watcher.observe(None, Instant::now()).is_none());
        assert_eq!(watcher.cursor(), Cursor::default());
    }

    #[tokio::test]
    async fn test_check_reads_updates_head() {
        let stub = Arc::new(StubFetcher::new().with("updates.json", r#"{"items": [100, 99], "profiles": []}"#));
        let mut watcher = watcher(stub.clone(), WatchSource::Updates);
        let now = Instant::now();

        assert!(watcher.check(now).await.is_none());
        stub.set("updates.json", r#"{"items": [101, 100], "profiles": ["pg"]}"#);
        assert_eq!(watcher.check(now).await.map(|n| n.head), Some(101));
    }

    #[tokio::test]
    async fn test_check_reads_feed_head() {
        let stub = Arc::new(StubFetcher::new().with_ids("topstories", &[7, 3]));
        let mut watcher = watcher(stub.clone(), WatchSource::Feed(FeedKind::TopStories));

        watcher.check(Instant::now()).await;
        assert_eq!(watcher.cursor().head, Some(7));
        assert_eq!(stub.requests(), vec!["topstories.json".to_string()]);
    }

    #[tokio::test]
    async fn test_check_swallows_errors() {
        let stub = Arc::new(StubFetcher::new().failing("updates.json"));
        let mut watcher = watcher(stub, WatchSource::Updates).with_cursor(Cursor {
            head: Some(1),
            last_notified: None,
        });

        assert!(watcher.check(Instant::now()).await.is_none());
        assert_eq!(watcher.cursor().head, Some(1));
    }

    #[test]
    fn test_source_parsing() {
        assert_eq!("updates".parse::<WatchSource>().unwrap(), WatchSource::Updates);
        assert_eq!(
            "topstories".parse::<WatchSource>().unwrap(),
            WatchSource::Feed(FeedKind::TopStories)
        );
        assert!("nope".parse::<WatchSource>().is_err());
        assert_eq!(WatchSource::Feed(FeedKind::NewStories).to_string(), "newstories");
    }
}
