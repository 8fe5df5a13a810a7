//! Lazily expanded comment threads.
//!
//! A thread is a tree of [`CommentNode`]s rooted at the post. Nodes start
//! collapsed. Expanding one fetches its replies (one level only), and
//! collapsing throws the rendered replies away, so expanding again fetches
//! them fresh.

mod loader;

pub use loader::CommentLoader;

use crate::domain::{Item, ItemId};
use crate::render::{render_comment, replies_label, CommentFragment};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    Collapsed,
    /// Replies requested, result not applied yet.
    Loading,
    Expanded(Vec<CommentNode>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The node was expanded and is now collapsed.
    Collapsed,
    /// The node is now loading. Fetch its replies and hand them to
    /// [`CommentNode::finish_expand`].
    Expand { id: ItemId, depth: usize },
    /// Nothing to do: already loading, hidden, or without replies.
    Ignored,
}

/// Result of loading one level of replies.
#[derive(Debug, Clone)]
pub struct Replies {
    pub reply_count: usize,
    pub children: Vec<CommentNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    pub id: ItemId,
    pub depth: usize,
    /// `None` for the thread root and for deleted or dead comments.
    pub fragment: Option<CommentFragment>,
    /// Last known number of direct replies.
    pub reply_count: usize,
    pub expansion: Expansion,
}

impl CommentNode {
    /// Thread root for a post.
    pub fn root(post_id: ItemId, reply_count: usize) -> Self {
        Self {
            id: post_id,
            depth: 0,
            fragment: None,
            reply_count,
            expansion: Expansion::Collapsed,
        }
    }

    pub fn from_item(item: &Item, depth: usize) -> Self {
        let fragment = render_comment(item, depth);
        let reply_count = if fragment.is_some() { item.kids.len() } else { 0 };
        Self {
            id: item.id,
            depth,
            fragment,
            reply_count,
            expansion: Expansion::Collapsed,
        }
    }

    pub fn is_root(&self) -> bool {
        self.depth == 0
    }

    pub fn is_hidden(&self) -> bool {
        !self.is_root() && self.fragment.is_none()
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self.expansion, Expansion::Expanded(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.expansion, Expansion::Loading)
    }

    pub fn children(&self) -> &[CommentNode] {
        match &self.expansion {
            Expansion::Expanded(children) => children,
            _ => &[],
        }
    }

    /// Whether a toggle control should be offered for this node.
    pub fn has_toggle(&self) -> bool {
        self.is_root() || (!self.is_hidden() && self.reply_count > 0)
    }

    pub fn toggle_label(&self) -> String {
        if self.is_loading() {
            "Loading...".to_string()
        } else {
            replies_label(self.is_expanded(), self.reply_count)
        }
    }

    pub fn begin_toggle(&mut self) -> ToggleOutcome {
        match self.expansion {
            Expansion::Expanded(_) => {
                self.expansion = Expansion::Collapsed;
                ToggleOutcome::Collapsed
            }
            Expansion::Loading => ToggleOutcome::Ignored,
            Expansion::Collapsed if !self.has_toggle() => ToggleOutcome::Ignored,
            Expansion::Collapsed => {
                self.expansion = Expansion::Loading;
                ToggleOutcome::Expand {
                    id: self.id,
                    depth: self.depth,
                }
            }
        }
    }

    /// Attach loaded replies. Ignored unless the node is still loading.
    pub fn finish_expand(&mut self, replies: Replies) -> bool {
        if !self.is_loading() {
            return false;
        }
        self.reply_count = replies.reply_count;
        self.expansion = Expansion::Expanded(replies.children);
        true
    }

    /// Give up on a pending expansion.
    pub fn cancel_expand(&mut self) -> bool {
        if !self.is_loading() {
            return false;
        }
        self.expansion = Expansion::Collapsed;
        true
    }

    pub fn find(&self, id: ItemId) -> Option<&CommentNode> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: ItemId) -> Option<&mut CommentNode> {
        if self.id == id {
            return Some(self);
        }
        match &mut self.expansion {
            Expansion::Expanded(children) => children.iter_mut().find_map(|c| c.find_mut(id)),
            _ => None,
        }
    }

    /// Displayed descendants in reading order. Hidden comments are skipped.
    pub fn visible(&self) -> Vec<&CommentNode> {
        let mut out = Vec::new();
        self.collect_visible(&mut out);
        out
    }

    fn collect_visible<'a>(&'a self, out: &mut Vec<&'a CommentNode>) {
        for child in self.children() {
            if child.is_hidden() {
                continue;
            }
            out.push(child);
            child.collect_visible(out);
        }
    }
}
