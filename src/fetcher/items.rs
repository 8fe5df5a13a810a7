use std::sync::Arc;

use crate::app::Result;
use crate::domain::{FeedKind, Item, ItemId, Updates};
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;

/// Typed access to the three upstream endpoints. One request per call,
/// no retry and no caching.
pub struct ItemFetcher {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    normalizer: Normalizer,
}

impl ItemFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self {
            fetcher,
            normalizer: Normalizer::new(),
        }
    }

    pub async fn fetch_item(&self, id: ItemId) -> Result<Item> {
        let body = self.fetcher.fetch(&format!("item/{}.json", id)).await?;
        self.normalizer.item(id, &body)
    }

    pub async fn fetch_feed_ids(&self, feed: FeedKind) -> Result<Vec<ItemId>> {
        let body = self.fetcher.fetch(&feed.path()).await?;
        let ids = self.normalizer.ids(feed.name(), &body)?;
        tracing::debug!("Feed {} has {} ids", feed, ids.len());
        Ok(ids)
    }

    pub async fn fetch_updates(&self) -> Result<Updates> {
        let body = self.fetcher.fetch("updates.json").await?;
        self.normalizer.updates(&body)
    }
}
