use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use textwrap::Options;

use crate::comments::CommentNode;
use crate::config::ColorConfig;
use crate::domain::FeedKind;
use crate::render::{PostContent, PostFragment};
use crate::tui::app::{ActivePane, ThreadRow, TuiApp};

pub fn render(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig) {
    let banner_height = if app.banner.is_some() { 1 } else { 0 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height), // Notification banner
            Constraint::Min(10),               // Panes
            Constraint::Length(1),             // Status bar
        ])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(40)])
        .split(rows[1]);

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FeedKind::ALL.len() as u16 + 2), // Feeds
            Constraint::Min(3),                                 // Headlines
        ])
        .split(columns[0]);

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Min(8)])
        .split(columns[1]);

    render_banner(frame, app, rows[0], colors);
    render_feeds_pane(frame, app, sidebar[0], colors);
    render_headlines(frame, app, sidebar[1], colors);
    render_posts_pane(frame, app, main[0], colors);
    render_thread_pane(frame, app, main[1], colors);
    render_status_bar(frame, app, rows[2], colors);
}

fn border_style(app: &TuiApp, pane: ActivePane, colors: &ColorConfig) -> Style {
    if app.active_pane == pane {
        Style::default().fg(colors.active_border)
    } else {
        Style::default().fg(colors.inactive_border)
    }
}

fn highlight_style(app: &TuiApp, pane: ActivePane, colors: &ColorConfig) -> Style {
    if app.active_pane == pane {
        Style::default()
            .bg(colors.selection_bg_active)
            .fg(colors.selection_fg_active)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .bg(colors.selection_bg_inactive)
            .fg(colors.selection_fg_inactive)
    }
}

fn render_banner(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let Some(banner) = &app.banner else {
        return;
    };
    let paragraph = Paragraph::new(format!(" {}  (R: refresh, Esc: dismiss)", banner.message))
        .style(
            Style::default()
                .fg(colors.banner_fg)
                .bg(colors.banner_bg)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(paragraph, area);
}

fn render_feeds_pane(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let current = app.controller.session().feed;
    let items: Vec<ListItem> = FeedKind::ALL
        .iter()
        .map(|feed| {
            let marker = if *feed == current { "●" } else { " " };
            ListItem::new(format!("{} {}", marker, feed.label()))
        })
        .collect();

    let block = Block::default()
        .title(" Feeds ")
        .borders(Borders::ALL)
        .border_style(border_style(app, ActivePane::Feeds, colors));

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style(app, ActivePane::Feeds, colors))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.feed_list_state);
}

fn render_headlines(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let width = area.width.saturating_sub(4) as usize;
    let lines: Vec<Line> = app
        .headlines
        .iter()
        .map(|item| {
            Line::from(vec![
                Span::styled("• ", Style::default().fg(colors.byline)),
                Span::raw(truncate(item.display_title(), width)),
            ])
        })
        .collect();

    let block = Block::default()
        .title(" Latest ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.inactive_border));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_posts_pane(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let width = area.width.saturating_sub(4) as usize;
    let mut items: Vec<ListItem> = app
        .controller
        .posts()
        .iter()
        .map(|post| {
            let expanded = app.controller.is_thread_expanded(post.id);
            let title = Line::from(Span::styled(
                truncate(&post.title, width),
                Style::default()
                    .fg(colors.post_title)
                    .add_modifier(Modifier::BOLD),
            ));
            let meta = Line::from(Span::styled(
                truncate(
                    &format!("{}  [{}]", post.byline(), post.comments_label(expanded)),
                    width,
                ),
                Style::default().fg(colors.byline),
            ));
            ListItem::new(Text::from(vec![title, meta]))
        })
        .collect();

    if !app.controller.session().exhausted {
        let label = if app.controller.is_loading_page() {
            "Loading..."
        } else {
            "Load more"
        };
        items.push(ListItem::new(Span::styled(
            label,
            Style::default().fg(colors.load_more),
        )));
    }

    let session = app.controller.session();
    let title = format!(
        " {} ({}) [{}/{}] ",
        session.feed.label(),
        app.controller.posts().len(),
        app.post_index + 1,
        app.post_row_count().max(1)
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(app, ActivePane::Posts, colors));

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style(app, ActivePane::Posts, colors))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.post_list_state);
}

fn render_thread_pane(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let width = area.width.saturating_sub(4) as usize;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, ActivePane::Thread, colors));

    let Some(post) = app.selected_post() else {
        let block = block.title(" Thread ");
        frame.render_widget(Paragraph::new("No post selected").block(block), area);
        return;
    };

    let thread = app.controller.thread(post.id);
    let expanded = app.controller.is_thread_expanded(post.id);
    let items: Vec<ListItem> = app
        .thread_rows()
        .into_iter()
        .map(|row| match row {
            ThreadRow::Post(_) => ListItem::new(Text::from(post_lines(post, expanded, width, colors))),
            ThreadRow::Comment(id) => {
                let lines = thread
                    .and_then(|t| t.find(id))
                    .map(|node| comment_lines(node, width, colors))
                    .unwrap_or_default();
                ListItem::new(Text::from(lines))
            }
        })
        .collect();

    let title = format!(" {} ", truncate(&post.title, width.saturating_sub(2)));
    let list = List::new(items)
        .block(block.title(title))
        .highlight_style(highlight_style(app, ActivePane::Thread, colors));

    frame.render_stateful_widget(list, area, &mut app.thread_list_state);
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let status = if let Some(ref msg) = app.status_message {
        msg.clone()
    } else {
        "j/k:Nav  Tab:Pane  Enter:Select  m:More  c:Comments  o:Open  R:Refresh  q:Quit".to_string()
    };

    let paragraph =
        Paragraph::new(status).style(Style::default().fg(colors.status_fg).bg(colors.status_bg));

    frame.render_widget(paragraph, area);
}

/// The post block of the thread pane.
pub fn post_lines(
    post: &PostFragment,
    expanded: bool,
    width: usize,
    colors: &ColorConfig,
) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        post.title.clone(),
        Style::default()
            .fg(colors.post_title)
            .add_modifier(Modifier::BOLD),
    ))];

    if let Some(url) = &post.url {
        lines.push(Line::from(Span::styled(
            url.clone(),
            Style::default().fg(colors.link),
        )));
    }
    lines.push(Line::from(Span::styled(
        post.byline(),
        Style::default().fg(colors.byline),
    )));

    let body = match &post.content {
        PostContent::Story { text } => text.clone(),
        PostContent::Job { description } => Some(description.clone()),
        PostContent::Poll { text, .. } => text.clone(),
    };
    if let Some(body) = body.filter(|b| !b.is_empty()) {
        lines.push(Line::from(""));
        lines.extend(wrap(&body, width).into_iter().map(Line::from));
    }

    if let PostContent::Poll { options, .. } = &post.content {
        lines.push(Line::from(""));
        for option in options {
            lines.push(Line::from(Span::styled(
                format!("  ◦ {}", option.state.label()),
                Style::default().fg(colors.poll_option),
            )));
        }
    }

    lines.push(Line::from(Span::styled(
        format!("[{}]", post.comments_label(expanded)),
        Style::default().fg(colors.load_more),
    )));
    lines
}

/// One comment, indented by depth. Hidden nodes produce no lines.
pub fn comment_lines(node: &CommentNode, width: usize, colors: &ColorConfig) -> Vec<Line<'static>> {
    let Some(fragment) = &node.fragment else {
        return Vec::new();
    };
    let pad = " ".repeat(fragment.indent());
    let text_width = width.saturating_sub(fragment.indent()).max(10);

    let mut lines = vec![Line::from(vec![
        Span::raw(pad.clone()),
        Span::styled(
            fragment.header(),
            Style::default().fg(colors.comment_author),
        ),
    ])];
    lines.extend(
        wrap(&fragment.text, text_width)
            .into_iter()
            .map(|l| Line::from(format!("{}{}", pad, l))),
    );
    if node.has_toggle() {
        lines.push(Line::from(vec![
            Span::raw(pad),
            Span::styled(
                format!("[{}]", node.toggle_label()),
                Style::default().fg(colors.load_more),
            ),
        ]));
    }
    lines
}

/// Word wrap to `width` terminal columns. Paragraph breaks in `text` are
/// kept; words wider than `width` get a line of their own.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let options = Options::new(width.max(1)).break_words(false);

    text.split('\n')
        .flat_map(|paragraph| textwrap::wrap(paragraph, &options))
        .map(|line| line.into_owned())
        .collect()
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let kept: String = s.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Item, ItemKind};
    use crate::render::{render, render_comment};

    fn text_of(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap("a\n\nb", 10), vec!["a", "", "b"]);
        assert_eq!(wrap("supercalifragilistic x", 5), vec!["supercalifragilistic", "x"]);
        assert_eq!(wrap("", 5), vec![""]);
    }

    #[test]
    fn test_wrap_measures_display_columns() {
        let lines = wrap("日本語 日本語 日本語", 8);
        assert!(lines.len() >= 3);
        assert!(lines.iter().all(|l| textwrap::core::display_width(l) <= 8));
        assert_eq!(lines.concat().replace(' ', ""), "日本語日本語日本語");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long title", 6), "a lon…");
    }

    #[test]
    fn test_comment_lines_are_indented() {
        let mut item = Item::new(5, ItemKind::Comment { parent: Some(1) });
        item.by = Some("carol".into());
        item.text = Some("hello there".into());
        item.kids = vec![6];
        let node = CommentNode::from_item(&item, 2);

        let lines = text_of(&comment_lines(&node, 80, &ColorConfig::default()));
        assert_eq!(lines[0], "    carol");
        assert_eq!(lines[1], "    hello there");
        assert_eq!(lines[2], "    [Show Replies (1)]");
        assert_eq!(render_comment(&item, 2).unwrap().indent(), 4);
    }

    #[test]
    fn test_hidden_comment_has_no_lines() {
        let mut item = Item::new(5, ItemKind::Comment { parent: Some(1) });
        item.deleted = true;
        let node = CommentNode::from_item(&item, 1);
        assert!(comment_lines(&node, 80, &ColorConfig::default()).is_empty());
    }

    #[test]
    fn test_poll_post_lines_show_placeholders() {
        let item = Item::new(
            7,
            ItemKind::Poll {
                title: Some("Tabs or spaces?".into()),
                parts: vec![8, 9],
                descendants: Some(0),
            },
        );
        let post = render(&item).unwrap();

        let lines = text_of(&post_lines(&post, false, 80, &ColorConfig::default()));
        assert_eq!(lines[0], "Tabs or spaces?");
        assert_eq!(lines.iter().filter(|l| l.contains("Loading option...")).count(), 2);
        assert_eq!(lines.last().unwrap(), "[Show Comments (0)]");
    }
}
