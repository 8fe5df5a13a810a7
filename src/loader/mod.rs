//! Feed pagination.

use std::ops::Range;
use std::sync::Arc;

use crate::app::Result;
use crate::domain::{FeedKind, Item};
use crate::fetcher::parallel::{FailurePolicy, ParallelFetcher};
use crate::fetcher::ItemFetcher;

/// One window of a feed.
#[derive(Debug, Clone)]
pub struct Page {
    pub feed: FeedKind,
    pub offset: usize,
    pub items: Vec<Item>,
    /// Offset of the first id after this window.
    pub next_offset: usize,
    /// Length of the feed's id list when the page was loaded.
    pub total: usize,
}

impl Page {
    pub fn is_last(&self) -> bool {
        self.next_offset >= self.total
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// `[offset, offset + size)` clamped to `len`. Empty when `offset >= len`.
pub fn page_window(len: usize, offset: usize, size: usize) -> Range<usize> {
    let start = offset.min(len);
    let end = offset.saturating_add(size).min(len);
    start..end
}

#[derive(Clone)]
pub struct FeedLoader {
    items: Arc<ItemFetcher>,
    parallel: ParallelFetcher,
    policy: FailurePolicy,
}

impl FeedLoader {
    pub fn new(parallel: ParallelFetcher, policy: FailurePolicy) -> Self {
        Self {
            items: parallel.item_fetcher().clone(),
            parallel,
            policy,
        }
    }

    /// Load the `[offset, offset + page_size)` window of `feed`.
    ///
    /// The id list is fetched fresh on every call, so callers should not fire
    /// this in a tight loop. Items are fetched concurrently and returned in
    /// feed order.
    pub async fn load_page(&self, feed: FeedKind, offset: usize, page_size: usize) -> Result<Page> {
        let ids = self.items.fetch_feed_ids(feed).await?;
        let window = page_window(ids.len(), offset, page_size);
        let next_offset = window.end.max(offset);

        let items = if window.is_empty() {
            Vec::new()
        } else {
            self.parallel
                .fetch_ordered(&ids[window.clone()], self.policy)
                .await?
        };

        tracing::info!(
            "Loaded {} items from {} [{}..{}) of {}",
            items.len(),
            feed,
            window.start,
            window.end,
            ids.len()
        );

        Ok(Page {
            feed,
            offset,
            items,
            next_offset,
            total: ids.len(),
        })
    }

    /// First `count` displayable items of `feed`, for the sidebar.
    pub async fn load_headlines(&self, feed: FeedKind, count: usize) -> Result<Vec<Item>> {
        let page = self.load_page(feed, 0, count).await?;
        Ok(page.items.into_iter().filter(|i| !i.is_hidden()).collect())
    }
}
