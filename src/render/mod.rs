//! Display fragments: plain data built from items, turned into terminal
//! lines by the TUI and into text by the CLI.

pub mod comment;
pub mod post;
pub mod text;

pub use comment::{render_comment, replies_label, CommentFragment, INDENT_WIDTH};
pub use post::{
    render, render_resolved, resolve_poll_options, OptionState, PollOptionSlot, PostContent,
    PostFragment,
};
