use chrono::{DateTime, Utc};

/// Upstream-assigned item identifier.
pub type ItemId = u64;

/// Type-specific fields of an item, resolved from the upstream `type` string
/// when the response is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Story {
        title: Option<String>,
        url: Option<String>,
        descendants: Option<u64>,
    },
    Job {
        title: Option<String>,
        url: Option<String>,
    },
    Poll {
        title: Option<String>,
        parts: Vec<ItemId>,
        descendants: Option<u64>,
    },
    PollOpt {
        poll: Option<ItemId>,
    },
    Comment {
        parent: Option<ItemId>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub by: Option<String>,
    pub time: Option<DateTime<Utc>>,
    pub text: Option<String>,
    pub score: Option<i64>,
    /// Child ids in upstream display order.
    pub kids: Vec<ItemId>,
    pub deleted: bool,
    pub dead: bool,
    pub kind: ItemKind,
}

impl Item {
    /// Bare item of the given kind, mostly useful for building fixtures.
    pub fn new(id: ItemId, kind: ItemKind) -> Self {
        Self {
            id,
            by: None,
            time: None,
            text: None,
            score: None,
            kids: Vec::new(),
            deleted: false,
            dead: false,
            kind,
        }
    }

    /// Deleted and dead items are never displayed.
    pub fn is_hidden(&self) -> bool {
        self.deleted || self.dead
    }

    pub fn title(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::Story { title, .. }
            | ItemKind::Job { title, .. }
            | ItemKind::Poll { title, .. } => title.as_deref(),
            ItemKind::PollOpt { .. } | ItemKind::Comment { .. } => None,
        }
    }

    pub fn display_title(&self) -> &str {
        self.title().unwrap_or("(Untitled)")
    }

    pub fn url(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::Story { url, .. } | ItemKind::Job { url, .. } => url.as_deref(),
            _ => None,
        }
    }

    pub fn author(&self) -> &str {
        self.by.as_deref().unwrap_or("unknown")
    }

    /// Total comment count, 0 when upstream omits it.
    pub fn descendants(&self) -> u64 {
        match &self.kind {
            ItemKind::Story { descendants, .. } | ItemKind::Poll { descendants, .. } => {
                descendants.unwrap_or(0)
            }
            _ => 0,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ItemKind::Story { .. } => "story",
            ItemKind::Job { .. } => "job",
            ItemKind::Poll { .. } => "poll",
            ItemKind::PollOpt { .. } => "pollopt",
            ItemKind::Comment { .. } => "comment",
        }
    }
}
