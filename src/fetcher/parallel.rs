use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::app::{ClonerError, Result};
use crate::domain::{Item, ItemId};
use crate::fetcher::ItemFetcher;

pub const DEFAULT_WORKERS: usize = 10;

/// What to do when one item of a batch fails to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// The first failure (in id order) fails the whole batch.
    #[default]
    FailFast,
    /// Failed items are logged and left out.
    SkipFailed,
}

/// Fetches a list of items concurrently, bounded by a semaphore, and hands
/// the results back in the order the ids were given.
#[derive(Clone)]
pub struct ParallelFetcher {
    items: Arc<ItemFetcher>,
    semaphore: Arc<Semaphore>,
}

impl ParallelFetcher {
    pub fn new(items: Arc<ItemFetcher>) -> Self {
        Self::with_workers(items, DEFAULT_WORKERS)
    }

    pub fn with_workers(items: Arc<ItemFetcher>, workers: usize) -> Self {
        Self {
            items,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    pub fn item_fetcher(&self) -> &Arc<ItemFetcher> {
        &self.items
    }

    pub async fn fetch_all(&self, ids: &[ItemId]) -> Vec<(ItemId, Result<Item>)> {
        let mut handles = Vec::with_capacity(ids.len());

        for &id in ids {
            let items = self.items.clone();
            let semaphore = self.semaphore.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|e| ClonerError::Other(format!("Semaphore closed: {}", e)))?;
                items.fetch_item(id).await
            });

            handles.push((id, handle));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            match handle.await {
                Ok(result) => results.push((id, result)),
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                    results.push((id, Err(ClonerError::Other(e.to_string()))));
                }
            }
        }

        results
    }

    /// Fetch `ids` concurrently and return the items in the same order.
    pub async fn fetch_ordered(&self, ids: &[ItemId], policy: FailurePolicy) -> Result<Vec<Item>> {
        let mut items = Vec::with_capacity(ids.len());

        for (id, result) in self.fetch_all(ids).await {
            match (result, policy) {
                (Ok(item), _) => items.push(item),
                (Err(e), FailurePolicy::FailFast) => return Err(e),
                (Err(e), FailurePolicy::SkipFailed) => {
                    tracing::warn!("Skipping item {}: {}", id, e);
                }
            }
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::testing::StubFetcher;

    fn stub() -> StubFetcher {
        StubFetcher::new()
            .with_story(1, "one", &[])
            .with_story(2, "two", &[])
            .with_story(3, "three", &[])
    }

    #[tokio::test]
    async fn test_order_is_preserved() {
        let fetcher = ParallelFetcher::with_workers(Arc::new(ItemFetcher::new(Arc::new(stub()))), 2);

        let items = fetcher
            .fetch_ordered(&[3, 1, 2], FailurePolicy::FailFast)
            .await
            .unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_fail_fast() {
        let stub = stub().failing("item/2.json");
        let fetcher = ParallelFetcher::new(Arc::new(ItemFetcher::new(Arc::new(stub))));

        let result = fetcher.fetch_ordered(&[1, 2, 3], FailurePolicy::FailFast).await;
        assert!(matches!(result, Err(ClonerError::Transport(_))));
    }

    #[tokio::test]
    async fn test_skip_failed() {
        let stub = stub().failing("item/2.json");
        let fetcher = ParallelFetcher::new(Arc::new(ItemFetcher::new(Arc::new(stub))));

        let items = fetcher
            .fetch_ordered(&[1, 2, 3], FailurePolicy::SkipFailed)
            .await
            .unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_fetch_all_reports_each_id() {
        let fetcher = ParallelFetcher::new(Arc::new(ItemFetcher::new(Arc::new(stub()))));

        let results = fetcher.fetch_all(&[1, 404]).await;
        assert_eq!(results.len(), 2);
        assert!(results[0].1.is_ok());
        assert_eq!(results[1].0, 404);
        assert!(matches!(results[1].1, Err(ClonerError::NotFound(_))));
    }
}
