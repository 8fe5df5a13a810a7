use crate::domain::{Item, ItemId};
use crate::render::text::{format_time, html_to_text};

/// Columns of indentation per nesting level.
pub const INDENT_WIDTH: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentFragment {
    pub id: ItemId,
    pub depth: usize,
    pub author: String,
    pub time: String,
    pub text: String,
}

impl CommentFragment {
    pub fn indent(&self) -> usize {
        self.depth * INDENT_WIDTH
    }

    pub fn header(&self) -> String {
        if self.time.is_empty() {
            self.author.clone()
        } else {
            format!("{} | {}", self.author, self.time)
        }
    }
}

/// Render a comment at `depth`. Deleted and dead comments render as nothing.
pub fn render_comment(item: &Item, depth: usize) -> Option<CommentFragment> {
    if item.is_hidden() {
        return None;
    }

    Some(CommentFragment {
        id: item.id,
        depth,
        author: item.author().to_string(),
        time: format_time(item.time),
        text: html_to_text(item.text.as_deref().unwrap_or("")),
    })
}

pub fn replies_label(expanded: bool, reply_count: usize) -> String {
    if expanded {
        "Hide".to_string()
    } else {
        format!("Show Replies ({})", reply_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemKind;

    fn comment() -> Item {
        let mut item = Item::new(4, ItemKind::Comment { parent: Some(1) });
        item.by = Some("Author".into());
        item.text = Some("Comment <i>text</i>".into());
        item.kids = vec![2];
        item
    }

    #[test]
    fn test_render_comment() {
        let fragment = render_comment(&comment(), 1).unwrap();
        assert_eq!(fragment.author, "Author");
        assert_eq!(fragment.text, "Comment text");
        assert_eq!(fragment.header(), "Author");
    }

    #[test]
    fn test_indent_grows_with_depth() {
        let shallow = render_comment(&comment(), 1).unwrap();
        let deep = render_comment(&comment(), 3).unwrap();
        assert_eq!(shallow.indent(), INDENT_WIDTH);
        assert_eq!(deep.indent(), 3 * INDENT_WIDTH);
    }

    #[test]
    fn test_hidden_comment_is_empty() {
        let mut item = comment();
        item.dead = true;
        assert!(render_comment(&item, 1).is_none());
    }

    #[test]
    fn test_replies_label() {
        assert_eq!(replies_label(false, 3), "Show Replies (3)");
        assert_eq!(replies_label(true, 3), "Hide");
    }
}
