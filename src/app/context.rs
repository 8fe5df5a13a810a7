use std::sync::Arc;

use crate::app::error::Result;
use crate::comments::CommentLoader;
use crate::config::Config;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::parallel::ParallelFetcher;
use crate::fetcher::{Fetcher, ItemFetcher};
use crate::loader::FeedLoader;

/// The shared, cheaply clonable pieces every front end needs.
pub struct AppContext {
    pub items: Arc<ItemFetcher>,
    pub parallel_fetcher: ParallelFetcher,
    pub loader: Arc<FeedLoader>,
    pub comments: Arc<CommentLoader>,
}

impl AppContext {
    pub fn new(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.api.base_url, config.api.timeout())?;
        Ok(Self::with_fetcher(Arc::new(fetcher), config))
    }

    /// Build on top of any transport, e.g. an in-memory one in tests.
    pub fn with_fetcher(fetcher: Arc<dyn Fetcher + Send + Sync>, config: &Config) -> Self {
        let items = Arc::new(ItemFetcher::new(fetcher));
        let parallel_fetcher = ParallelFetcher::with_workers(items.clone(), config.api.max_concurrency);
        let loader = FeedLoader::new(parallel_fetcher.clone(), config.feed.failure_policy());
        let comments = CommentLoader::new(parallel_fetcher.clone());

        Self {
            items,
            parallel_fetcher,
            loader: Arc::new(loader),
            comments: Arc::new(comments),
        }
    }
}
