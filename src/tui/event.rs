use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use std::time::Duration;

use crate::app::Result;
use crate::comments::Replies;
use crate::controller::{ExpandRequest, PageRequest};
use crate::domain::{Item, ItemId};
use crate::loader::Page;

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
}

pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    pub fn next(&self) -> Result<AppEvent> {
        if event::poll(self.tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(AppEvent::Key(key));
                }
            }
        }
        Ok(AppEvent::Tick)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    NextPane,
    PrevPane,
    Select,
    LoadMore,
    ToggleComments,
    OpenInBrowser,
    Refresh,
    Dismiss,
    None,
}

/// Results coming back from spawned fetch tasks.
pub enum AppMessage {
    PageLoaded(PageRequest, Result<Page>),
    RepliesLoaded(ExpandRequest, Result<Replies>),
    PollOptionLoaded {
        post: ItemId,
        option: ItemId,
        result: Result<Item>,
    },
    HeadlinesLoaded(Result<Vec<Item>>),
}
