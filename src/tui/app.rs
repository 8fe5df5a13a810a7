use std::time::{Duration, Instant};

use ratatui::widgets::ListState;

use crate::controller::ViewController;
use crate::domain::{FeedKind, Item, ItemId};
use crate::render::PostFragment;
use crate::watcher::Throttle;

/// Minimum gap between two manual refreshes.
pub const REFRESH_THROTTLE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Feeds,
    Posts,
    Thread,
}

impl ActivePane {
    pub fn next(self) -> Self {
        match self {
            ActivePane::Feeds => ActivePane::Posts,
            ActivePane::Posts => ActivePane::Thread,
            ActivePane::Thread => ActivePane::Feeds,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActivePane::Feeds => ActivePane::Thread,
            ActivePane::Posts => ActivePane::Feeds,
            ActivePane::Thread => ActivePane::Posts,
        }
    }
}

/// One selectable row of the thread pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadRow {
    Post(ItemId),
    Comment(ItemId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub message: String,
    pub shown_at: Instant,
}

pub struct TuiApp {
    pub controller: ViewController,
    pub active_pane: ActivePane,
    pub feed_index: usize,
    pub post_index: usize,
    pub thread_index: usize,
    pub headlines: Vec<Item>,
    pub banner: Option<Banner>,
    pub banner_duration: Duration,
    pub status_message: Option<String>,
    pub should_quit: bool,
    pub refresh_throttle: Throttle,
    pub feed_list_state: ListState,
    pub post_list_state: ListState,
    pub thread_list_state: ListState,
}

impl TuiApp {
    pub fn new(controller: ViewController, banner_duration: Duration) -> Self {
        let feed_index = FeedKind::ALL
            .iter()
            .position(|f| *f == controller.session().feed)
            .unwrap_or(0);

        let mut feed_list_state = ListState::default();
        feed_list_state.select(Some(feed_index));
        let mut post_list_state = ListState::default();
        post_list_state.select(Some(0));
        let mut thread_list_state = ListState::default();
        thread_list_state.select(Some(0));

        Self {
            controller,
            active_pane: ActivePane::Posts,
            feed_index,
            post_index: 0,
            thread_index: 0,
            headlines: Vec::new(),
            banner: None,
            banner_duration,
            status_message: None,
            should_quit: false,
            refresh_throttle: Throttle::new(REFRESH_THROTTLE),
            feed_list_state,
            post_list_state,
            thread_list_state,
        }
    }

    pub fn selected_feed(&self) -> FeedKind {
        FeedKind::ALL[self.feed_index.min(FeedKind::ALL.len() - 1)]
    }

    /// Posts plus the trailing "load more" row, which disappears once the
    /// feed is exhausted.
    pub fn post_row_count(&self) -> usize {
        let posts = self.controller.posts().len();
        if self.controller.session().exhausted {
            posts
        } else {
            posts + 1
        }
    }

    pub fn is_load_more_selected(&self) -> bool {
        !self.controller.session().exhausted && self.post_index == self.controller.posts().len()
    }

    pub fn selected_post(&self) -> Option<&PostFragment> {
        self.controller.posts().get(self.post_index)
    }

    /// Rows of the thread pane for the selected post: the post itself, then
    /// every visible comment in reading order.
    pub fn thread_rows(&self) -> Vec<ThreadRow> {
        let Some(post) = self.selected_post() else {
            return Vec::new();
        };

        let mut rows = vec![ThreadRow::Post(post.id)];
        if let Some(thread) = self.controller.thread(post.id) {
            rows.extend(thread.visible().iter().map(|node| ThreadRow::Comment(node.id)));
        }
        rows
    }

    /// Node to toggle for the selected thread row. The post row maps to the
    /// thread root.
    pub fn selected_thread_node(&self) -> Option<ItemId> {
        match self.thread_rows().get(self.thread_index)? {
            ThreadRow::Post(id) | ThreadRow::Comment(id) => Some(*id),
        }
    }

    pub fn move_up(&mut self) {
        match self.active_pane {
            ActivePane::Feeds => {
                self.feed_index = self.feed_index.saturating_sub(1);
                self.feed_list_state.select(Some(self.feed_index));
            }
            ActivePane::Posts => {
                if self.post_index > 0 {
                    self.post_index -= 1;
                    self.post_list_state.select(Some(self.post_index));
                    self.reset_thread_selection();
                }
            }
            ActivePane::Thread => {
                self.thread_index = self.thread_index.saturating_sub(1);
                self.thread_list_state.select(Some(self.thread_index));
            }
        }
    }

    pub fn move_down(&mut self) {
        match self.active_pane {
            ActivePane::Feeds => {
                if self.feed_index + 1 < FeedKind::ALL.len() {
                    self.feed_index += 1;
                    self.feed_list_state.select(Some(self.feed_index));
                }
            }
            ActivePane::Posts => {
                if self.post_index + 1 < self.post_row_count() {
                    self.post_index += 1;
                    self.post_list_state.select(Some(self.post_index));
                    self.reset_thread_selection();
                }
            }
            ActivePane::Thread => {
                if self.thread_index + 1 < self.thread_rows().len() {
                    self.thread_index += 1;
                    self.thread_list_state.select(Some(self.thread_index));
                }
            }
        }
    }

    /// Back to the top after the post list was replaced.
    pub fn reset_post_selection(&mut self) {
        self.post_index = 0;
        self.post_list_state.select(Some(0));
        self.reset_thread_selection();
    }

    fn reset_thread_selection(&mut self) {
        self.thread_index = 0;
        self.thread_list_state.select(Some(0));
    }

    /// Keep selections inside their lists after the lists changed.
    pub fn clamp_selection(&mut self) {
        let posts = self.post_row_count().max(1);
        if self.post_index >= posts {
            self.post_index = posts - 1;
            self.post_list_state.select(Some(self.post_index));
        }
        let rows = self.thread_rows().len().max(1);
        if self.thread_index >= rows {
            self.thread_index = rows - 1;
            self.thread_list_state.select(Some(self.thread_index));
        }
    }

    pub fn show_banner(&mut self, message: String, now: Instant) {
        self.banner = Some(Banner {
            message,
            shown_at: now,
        });
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// Hide the banner once it has been up for `banner_duration`.
    pub fn expire_banner(&mut self, now: Instant) -> bool {
        let expired = self
            .banner
            .as_ref()
            .is_some_and(|b| now.saturating_duration_since(b.shown_at) >= self.banner_duration);
        if expired {
            self.banner = None;
        }
        expired
    }

    /// Time-based upkeep, run once per loop iteration whatever the event.
    pub fn on_frame(&mut self, now: Instant) {
        self.expire_banner(now);
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::{CommentNode, Replies};
    use crate::controller::ExpandRequest;
    use crate::domain::ItemKind;
    use crate::loader::Page;

    fn story(id: ItemId, kids: Vec<ItemId>) -> Item {
        let mut item = Item::new(
            id,
            ItemKind::Story {
                title: Some(format!("story {}", id)),
                url: None,
                descendants: Some(kids.len() as u64),
            },
        );
        item.kids = kids;
        item
    }

    fn comment(id: ItemId) -> Item {
        let mut item = Item::new(id, ItemKind::Comment { parent: None });
        item.text = Some(format!("comment {}", id));
        item
    }

    fn app_with_posts(items: Vec<Item>) -> TuiApp {
        let mut controller = ViewController::new(FeedKind::NewStories, 5);
        let request = controller.load_more().unwrap();
        let next_offset = items.len();
        let page = Page {
            feed: FeedKind::NewStories,
            offset: 0,
            items,
            next_offset,
            total: 50,
        };
        controller.apply_page(request, Ok(page));
        TuiApp::new(controller, Duration::from_secs(10))
    }

    fn expand(app: &mut TuiApp, post: ItemId, children: &[ItemId]) {
        let request: ExpandRequest = app.controller.toggle_comments(post, post).unwrap();
        let replies = Replies {
            reply_count: children.len(),
            children: children
                .iter()
                .map(|&id| CommentNode::from_item(&comment(id), 1))
                .collect(),
        };
        app.controller.apply_replies(request, Ok(replies));
    }

    #[test]
    fn test_starts_on_configured_feed() {
        let app = app_with_posts(vec![]);
        assert_eq!(app.selected_feed(), FeedKind::NewStories);
    }

    #[test]
    fn test_load_more_row_is_last() {
        let mut app = app_with_posts(vec![story(1, vec![]), story(2, vec![])]);
        assert_eq!(app.post_row_count(), 3);
        assert!(!app.is_load_more_selected());

        app.move_down();
        app.move_down();
        app.move_down();
        assert_eq!(app.post_index, 2);
        assert!(app.is_load_more_selected());
        assert!(app.selected_post().is_none());
    }

    #[test]
    fn test_thread_rows_follow_expansion() {
        let mut app = app_with_posts(vec![story(1, vec![10, 11])]);
        assert_eq!(app.thread_rows(), vec![ThreadRow::Post(1)]);

        expand(&mut app, 1, &[10, 11]);
        assert_eq!(
            app.thread_rows(),
            vec![ThreadRow::Post(1), ThreadRow::Comment(10), ThreadRow::Comment(11)]
        );

        app.active_pane = ActivePane::Thread;
        app.move_down();
        app.move_down();
        app.move_down();
        assert_eq!(app.selected_thread_node(), Some(11));
    }

    #[test]
    fn test_moving_posts_resets_thread_selection() {
        let mut app = app_with_posts(vec![story(1, vec![10]), story(2, vec![])]);
        expand(&mut app, 1, &[10]);
        app.thread_index = 1;

        app.active_pane = ActivePane::Posts;
        app.move_down();
        assert_eq!(app.thread_index, 0);
        assert_eq!(app.selected_thread_node(), Some(2));
    }

    #[test]
    fn test_banner_expires() {
        let mut app = app_with_posts(vec![]);
        let now = Instant::now();
        app.show_banner("New updates available!".into(), now);

        assert!(!app.expire_banner(now + Duration::from_secs(9)));
        assert!(app.banner.is_some());
        assert!(app.expire_banner(now + Duration::from_secs(10)));
        assert!(app.banner.is_none());
    }

    #[test]
    fn test_banner_expires_between_key_presses() {
        let mut app = app_with_posts(vec![story(1, vec![]), story(2, vec![])]);
        let now = Instant::now();
        app.show_banner("New updates available!".into(), now);

        // Keys arriving faster than the tick rate still let the banner go.
        for ms in (0..=10_000).step_by(50) {
            app.move_down();
            app.on_frame(now + Duration::from_millis(ms));
        }
        assert!(app.banner.is_none());
    }

    #[test]
    fn test_clamp_after_refresh() {
        let mut app = app_with_posts(vec![story(1, vec![]), story(2, vec![])]);
        app.post_index = 2;
        app.controller.refresh();
        app.clamp_selection();
        assert_eq!(app.post_index, 0);
    }

    #[test]
    fn test_pane_cycle() {
        assert_eq!(ActivePane::Feeds.next(), ActivePane::Posts);
        assert_eq!(ActivePane::Thread.next(), ActivePane::Feeds);
        assert_eq!(ActivePane::Feeds.prev(), ActivePane::Thread);
    }
}
