use std::sync::Arc;

use futures::stream::{FuturesUnordered, Stream, StreamExt};

use crate::app::Result;
use crate::domain::{Item, ItemId, ItemKind};
use crate::fetcher::ItemFetcher;
use crate::render::text::{format_time, html_to_text};

pub const LOADING_OPTION: &str = "Loading option...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionState {
    Loading,
    Loaded { text: String, score: i64 },
    Failed,
}

impl OptionState {
    pub fn label(&self) -> String {
        match self {
            OptionState::Loading => LOADING_OPTION.to_string(),
            OptionState::Loaded { text, score } => format!("{} ({} points)", text, score),
            OptionState::Failed => "Option unavailable".to_string(),
        }
    }
}

/// A poll option placeholder, keyed by the option's item id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOptionSlot {
    pub id: ItemId,
    pub state: OptionState,
}

/// Type-specific part of a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostContent {
    Story { text: Option<String> },
    Job { description: String },
    Poll {
        text: Option<String>,
        options: Vec<PollOptionSlot>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFragment {
    pub id: ItemId,
    pub title: String,
    pub url: Option<String>,
    pub author: String,
    pub score: i64,
    pub time: String,
    pub content: PostContent,
    /// Upstream `descendants`, 0 when absent.
    pub comment_count: u64,
    /// Number of direct replies (`kids`).
    pub reply_count: usize,
}

impl PostFragment {
    pub fn byline(&self) -> String {
        let mut line = format!("By {} | {} points", self.author, self.score);
        if !self.time.is_empty() {
            line.push_str(" | ");
            line.push_str(&self.time);
        }
        line
    }

    pub fn comments_label(&self, expanded: bool) -> String {
        if expanded {
            "Hide Comments".to_string()
        } else {
            format!("Show Comments ({})", self.comment_count)
        }
    }

    /// Option ids still showing their placeholder.
    pub fn pending_options(&self) -> Vec<ItemId> {
        match &self.content {
            PostContent::Poll { options, .. } => options
                .iter()
                .filter(|o| o.state == OptionState::Loading)
                .map(|o| o.id)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Replace the placeholder keyed by `option_id`. Applying twice is
    /// harmless and the last result wins. Returns false when this post has no
    /// such option.
    pub fn resolve_option(&mut self, option_id: ItemId, result: Result<Item>) -> bool {
        let PostContent::Poll { options, .. } = &mut self.content else {
            return false;
        };
        let Some(slot) = options.iter_mut().find(|o| o.id == option_id) else {
            return false;
        };

        slot.state = match result {
            Ok(option) if !option.is_hidden() => OptionState::Loaded {
                text: html_to_text(option.text.as_deref().unwrap_or("")),
                score: option.score.unwrap_or(0),
            },
            Ok(_) => OptionState::Failed,
            Err(e) => {
                tracing::warn!("Poll option {} of {} failed: {}", option_id, self.id, e);
                OptionState::Failed
            }
        };
        true
    }
}

/// Build the display fragment for a feed item. Deleted and dead items render
/// as nothing.
///
/// No I/O happens here: poll options come back as placeholders, to be filled
/// through [`PostFragment::resolve_option`].
pub fn render(item: &Item) -> Option<PostFragment> {
    if item.is_hidden() {
        return None;
    }

    let text = item.text.as_deref().map(html_to_text);

    let content = match &item.kind {
        ItemKind::Job { .. } => PostContent::Job {
            description: format!("Job Posting: {}", text.unwrap_or_default()),
        },
        ItemKind::Poll { parts, .. } => PostContent::Poll {
            text,
            options: parts
                .iter()
                .map(|&id| PollOptionSlot {
                    id,
                    state: OptionState::Loading,
                })
                .collect(),
        },
        ItemKind::Story { .. } | ItemKind::PollOpt { .. } | ItemKind::Comment { .. } => {
            PostContent::Story { text }
        }
    };

    Some(PostFragment {
        id: item.id,
        title: item.display_title().to_string(),
        url: item.url().map(String::from),
        author: item.author().to_string(),
        score: item.score.unwrap_or(0),
        time: format_time(item.time),
        content,
        comment_count: item.descendants(),
        reply_count: item.kids.len(),
    })
}

/// Fetch poll options concurrently. Results arrive in completion order.
pub fn resolve_poll_options(
    items: Arc<ItemFetcher>,
    option_ids: &[ItemId],
) -> impl Stream<Item = (ItemId, Result<Item>)> + Send + 'static {
    option_ids
        .iter()
        .map(|&id| {
            let items = items.clone();
            async move { (id, items.fetch_item(id).await) }
        })
        .collect::<FuturesUnordered<_>>()
}

/// Render and wait for every poll option, for one-shot output.
pub async fn render_resolved(items: Arc<ItemFetcher>, item: &Item) -> Option<PostFragment> {
    let mut fragment = render(item)?;
    let mut options = resolve_poll_options(items, &fragment.pending_options());
    while let Some((id, result)) = options.next().await {
        fragment.resolve_option(id, result);
    }
    Some(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ClonerError;
    use crate::fetcher::testing::StubFetcher;

    fn story() -> Item {
        let mut item = Item::new(
            1,
            ItemKind::Story {
                title: Some("Test Post".into()),
                url: Some("http://example.com".into()),
                descendants: Some(10),
            },
        );
        item.by = Some("Author".into());
        item.score = Some(100);
        item.text = Some("Some post content".into());
        item.time = chrono::DateTime::from_timestamp(1633055462, 0);
        item.kids = vec![2, 3];
        item
    }

    fn poll(parts: Vec<ItemId>) -> Item {
        Item::new(
            7,
            ItemKind::Poll {
                title: Some("Favourite editor?".into()),
                parts,
                descendants: None,
            },
        )
    }

    #[test]
    fn test_story_block() {
        let fragment = render(&story()).unwrap();

        assert_eq!(fragment.title, "Test Post");
        assert_eq!(fragment.url.as_deref(), Some("http://example.com"));
        assert!(fragment.byline().starts_with("By Author |"));
        assert!(fragment.byline().contains("100 points"));
        assert_eq!(
            fragment.content,
            PostContent::Story {
                text: Some("Some post content".into())
            }
        );
        assert_eq!(fragment.comments_label(false), "Show Comments (10)");
        assert_eq!(fragment.comments_label(true), "Hide Comments");
        assert_eq!(fragment.reply_count, 2);
    }

    #[test]
    fn test_render_is_deterministic() {
        let item = story();
        assert_eq!(render(&item), render(&item));
    }

    #[test]
    fn test_job_is_description_only() {
        let mut job = Item::new(
            3,
            ItemKind::Job {
                title: Some("We're hiring".into()),
                url: None,
            },
        );
        job.text = Some("Job description".into());

        let fragment = render(&job).unwrap();
        assert_eq!(
            fragment.content,
            PostContent::Job {
                description: "Job Posting: Job description".into()
            }
        );
        assert_eq!(fragment.comments_label(false), "Show Comments (0)");
    }

    #[test]
    fn test_poll_starts_with_placeholders() {
        let fragment = render(&poll(vec![1, 2])).unwrap();

        assert_eq!(fragment.pending_options(), vec![1, 2]);
        match &fragment.content {
            PostContent::Poll { options, .. } => {
                assert!(options.iter().all(|o| o.state.label() == LOADING_OPTION));
            }
            other => panic!("expected poll content, got {:?}", other),
        }
    }

    #[test]
    fn test_hidden_item_renders_empty() {
        let mut item = story();
        item.deleted = true;
        assert!(render(&item).is_none());

        let mut item = story();
        item.dead = true;
        assert!(render(&item).is_none());
    }

    #[test]
    fn test_resolve_option_any_order_and_idempotent() {
        let mut fragment = render(&poll(vec![1, 2])).unwrap();

        let option = |id: ItemId, text: &str, score: i64| {
            let mut o = Item::new(id, ItemKind::PollOpt { poll: Some(7) });
            o.text = Some(text.into());
            o.score = Some(score);
            o
        };

        assert!(fragment.resolve_option(2, Ok(option(2, "Option 2", 20))));
        assert_eq!(fragment.pending_options(), vec![1]);
        assert!(fragment.resolve_option(1, Ok(option(1, "Option 1", 10))));
        assert!(fragment.resolve_option(1, Ok(option(1, "Option 1", 11))));
        assert!(!fragment.resolve_option(99, Ok(option(99, "stray", 0))));

        match &fragment.content {
            PostContent::Poll { options, .. } => {
                assert_eq!(options[0].id, 1);
                assert_eq!(options[0].state.label(), "Option 1 (11 points)");
                assert_eq!(options[1].state.label(), "Option 2 (20 points)");
            }
            other => panic!("expected poll content, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_option() {
        let mut fragment = render(&poll(vec![1])).unwrap();
        fragment.resolve_option(1, Err(ClonerError::Transport("timeout".into())));
        assert!(fragment.pending_options().is_empty());
        match &fragment.content {
            PostContent::Poll { options, .. } => assert_eq!(options[0].state, OptionState::Failed),
            other => panic!("expected poll content, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_on_story_is_noop() {
        let mut fragment = render(&story()).unwrap();
        let before = fragment.clone();
        assert!(!fragment.resolve_option(2, Err(ClonerError::Other("x".into()))));
        assert_eq!(fragment, before);
    }

    #[tokio::test]
    async fn test_render_resolved_fetches_options() {
        let stub = StubFetcher::new()
            .with("item/1.json", r#"{"id": 1, "type": "pollopt", "text": "Option 1", "score": 10}"#)
            .with("item/2.json", r#"{"id": 2, "type": "pollopt", "text": "Option 2", "score": 20}"#);
        let items = Arc::new(ItemFetcher::new(Arc::new(stub)));

        let fragment = render_resolved(items, &poll(vec![1, 2])).await.unwrap();
        match &fragment.content {
            PostContent::Poll { options, .. } => {
                let labels: Vec<_> = options.iter().map(|o| o.state.label()).collect();
                assert_eq!(labels, vec!["Option 1 (10 points)", "Option 2 (20 points)"]);
            }
            other => panic!("expected poll content, got {:?}", other),
        }
    }
}
