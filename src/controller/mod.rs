//! Session state and the user intents that drive it.
//!
//! [`ViewController`] never does I/O. Each intent hands back a request the
//! caller runs (usually on a spawned task) and feeds back through one of the
//! `apply_*` methods. Requests carry the session generation they were issued
//! under, so results that arrive after a feed switch or refresh are dropped.

use std::collections::HashMap;

use crate::app::Result;
use crate::comments::{CommentLoader, CommentNode, Replies, ToggleOutcome};
use crate::domain::{FeedKind, Item, ItemId};
use crate::loader::{FeedLoader, Page};
use crate::render::{render, PostFragment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub feed: FeedKind,
    /// Feed position of the next page.
    pub offset: usize,
    pub generation: u64,
    pub exhausted: bool,
}

impl Session {
    pub fn new(feed: FeedKind) -> Self {
        Self {
            feed,
            offset: 0,
            generation: 0,
            exhausted: false,
        }
    }

    fn reset(&mut self, feed: FeedKind) {
        self.feed = feed;
        self.offset = 0;
        self.generation += 1;
        self.exhausted = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub feed: FeedKind,
    pub offset: usize,
    pub page_size: usize,
    pub generation: u64,
}

impl PageRequest {
    pub async fn execute(self, loader: &FeedLoader) -> Result<Page> {
        loader.load_page(self.feed, self.offset, self.page_size).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandRequest {
    pub post: ItemId,
    pub node: ItemId,
    pub depth: usize,
    pub generation: u64,
}

impl ExpandRequest {
    pub async fn execute(self, comments: &CommentLoader) -> Result<Replies> {
        comments.load_replies(self.node, self.depth).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Appended {
        count: usize,
        /// `(post, option ids)` for every appended poll.
        pending_polls: Vec<(ItemId, Vec<ItemId>)>,
    },
    Exhausted,
    Stale,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepliesOutcome {
    Applied,
    Failed(String),
    Stale,
}

pub struct ViewController {
    session: Session,
    page_size: usize,
    posts: Vec<PostFragment>,
    threads: HashMap<ItemId, CommentNode>,
    page_in_flight: Option<PageRequest>,
}

impl ViewController {
    pub fn new(feed: FeedKind, page_size: usize) -> Self {
        Self {
            session: Session::new(feed),
            page_size: page_size.max(1),
            posts: Vec::new(),
            threads: HashMap::new(),
            page_in_flight: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn posts(&self) -> &[PostFragment] {
        &self.posts
    }

    pub fn post(&self, id: ItemId) -> Option<&PostFragment> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn thread(&self, post: ItemId) -> Option<&CommentNode> {
        self.threads.get(&post)
    }

    pub fn is_thread_expanded(&self, post: ItemId) -> bool {
        self.threads.get(&post).is_some_and(|t| t.is_expanded())
    }

    pub fn is_loading_page(&self) -> bool {
        self.page_in_flight.is_some()
    }

    /// Next page of the current feed. `None` while a page is loading or once
    /// the feed has run out.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if self.page_in_flight.is_some() || self.session.exhausted {
            return None;
        }

        let request = PageRequest {
            feed: self.session.feed,
            offset: self.session.offset,
            page_size: self.page_size,
            generation: self.session.generation,
        };
        self.page_in_flight = Some(request);
        Some(request)
    }

    pub fn switch_feed(&mut self, feed: FeedKind) -> PageRequest {
        tracing::info!("Switching to {}", feed);
        self.restart(feed)
    }

    /// Back to the top of the current feed.
    pub fn refresh(&mut self) -> PageRequest {
        tracing::info!("Refreshing {}", self.session.feed);
        self.restart(self.session.feed)
    }

    fn restart(&mut self, feed: FeedKind) -> PageRequest {
        self.session.reset(feed);
        self.posts.clear();
        self.threads.clear();
        self.page_in_flight = None;

        let request = PageRequest {
            feed,
            offset: 0,
            page_size: self.page_size,
            generation: self.session.generation,
        };
        self.page_in_flight = Some(request);
        request
    }

    pub fn apply_page(&mut self, request: PageRequest, result: Result<Page>) -> PageOutcome {
        if self.page_in_flight != Some(request) {
            tracing::debug!(
                "Dropping stale page {}@{} (generation {})",
                request.feed,
                request.offset,
                request.generation
            );
            return PageOutcome::Stale;
        }
        self.page_in_flight = None;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Loading {}@{} failed: {}", request.feed, request.offset, e);
                return PageOutcome::Failed(e.to_string());
            }
        };

        if page.next_offset <= request.offset {
            self.session.exhausted = true;
            return PageOutcome::Exhausted;
        }
        self.session.offset = page.next_offset;

        let mut count = 0;
        let mut pending_polls = Vec::new();
        for fragment in page.items.iter().filter_map(render) {
            if self.posts.iter().any(|p| p.id == fragment.id) {
                continue;
            }
            let pending = fragment.pending_options();
            if !pending.is_empty() {
                pending_polls.push((fragment.id, pending));
            }
            self.posts.push(fragment);
            count += 1;
        }

        PageOutcome::Appended {
            count,
            pending_polls,
        }
    }

    /// Toggle the thread root (`node == post`) or a comment inside the
    /// thread of `post`. Returns the fetch to run when this expands a node.
    pub fn toggle_comments(&mut self, post: ItemId, node: ItemId) -> Option<ExpandRequest> {
        let reply_count = self.post(post)?.reply_count;
        let tree = self
            .threads
            .entry(post)
            .or_insert_with(|| CommentNode::root(post, reply_count));

        match tree.find_mut(node)?.begin_toggle() {
            ToggleOutcome::Expand { id, depth } => Some(ExpandRequest {
                post,
                node: id,
                depth,
                generation: self.session.generation,
            }),
            ToggleOutcome::Collapsed => {
                if node == post {
                    self.threads.remove(&post);
                }
                None
            }
            ToggleOutcome::Ignored => None,
        }
    }

    pub fn apply_replies(&mut self, request: ExpandRequest, result: Result<Replies>) -> RepliesOutcome {
        if request.generation != self.session.generation {
            return RepliesOutcome::Stale;
        }
        let Some(node) = self
            .threads
            .get_mut(&request.post)
            .and_then(|t| t.find_mut(request.node))
        else {
            return RepliesOutcome::Stale;
        };

        match result {
            Ok(replies) => {
                if node.finish_expand(replies) {
                    RepliesOutcome::Applied
                } else {
                    RepliesOutcome::Stale
                }
            }
            Err(e) => {
                tracing::warn!("Loading replies of {} failed: {}", request.node, e);
                if node.cancel_expand() {
                    RepliesOutcome::Failed(e.to_string())
                } else {
                    RepliesOutcome::Stale
                }
            }
        }
    }

    /// Fill in one poll option. False when the post is gone or has no such
    /// option.
    pub fn apply_poll_option(&mut self, post: ItemId, option: ItemId, result: Result<Item>) -> bool {
        match self.posts.iter_mut().find(|p| p.id == post) {
            Some(fragment) => fragment.resolve_option(option, result),
            None => false,
        }
    }
}
