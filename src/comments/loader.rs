use std::sync::Arc;

use crate::app::{ClonerError, Result};
use crate::comments::{CommentNode, Replies, ToggleOutcome};
use crate::domain::ItemId;
use crate::fetcher::parallel::{FailurePolicy, ParallelFetcher};
use crate::fetcher::ItemFetcher;

#[derive(Clone)]
pub struct CommentLoader {
    items: Arc<ItemFetcher>,
    parallel: ParallelFetcher,
}

impl CommentLoader {
    pub fn new(parallel: ParallelFetcher) -> Self {
        Self {
            items: parallel.item_fetcher().clone(),
            parallel,
        }
    }

    /// Fetch `id` and then all of its direct replies concurrently, rendered at
    /// `depth + 1`. A deleted or dead node has no replies and its kids are
    /// never requested.
    pub async fn load_replies(&self, id: ItemId, depth: usize) -> Result<Replies> {
        let item = self.items.fetch_item(id).await?;

        if item.is_hidden() {
            tracing::debug!("Item {} is hidden, not loading replies", id);
            return Ok(Replies {
                reply_count: 0,
                children: Vec::new(),
            });
        }

        let kids = self
            .parallel
            .fetch_ordered(&item.kids, FailurePolicy::FailFast)
            .await?;

        let children: Vec<CommentNode> = kids
            .iter()
            .map(|kid| CommentNode::from_item(kid, depth + 1))
            .collect();

        tracing::debug!("Loaded {} replies of {} at depth {}", children.len(), id, depth + 1);

        Ok(Replies {
            reply_count: item.kids.len(),
            children,
        })
    }

    /// Toggle node `id` of `tree` and, when that expands it, load and attach
    /// its replies before returning. On failure the node is left collapsed.
    pub async fn toggle(&self, tree: &mut CommentNode, id: ItemId) -> Result<ToggleOutcome> {
        let root = tree.id;
        let node = tree
            .find_mut(id)
            .ok_or_else(|| ClonerError::NotFound(format!("comment {} in thread {}", id, root)))?;

        let outcome = node.begin_toggle();
        if let ToggleOutcome::Expand { id, depth } = outcome {
            match self.load_replies(id, depth).await {
                Ok(replies) => {
                    node.finish_expand(replies);
                }
                Err(e) => {
                    node.cancel_expand();
                    return Err(e);
                }
            }
        }

        Ok(outcome)
    }
}
