use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::{mpsc, Mutex};

use crate::app::{AppContext, Result};
use crate::comments::CommentNode;
use crate::config::Config;
use crate::domain::{FeedKind, ItemId};
use crate::render::{render, render_resolved, PostContent, PostFragment};
use crate::watcher::{format_interval, spawn_update_watcher, UpdateWatcher};

/// Print one page of `feed`. A `limit` of 0 is treated as 1.
pub async fn list_page(ctx: &AppContext, feed: FeedKind, offset: usize, limit: usize) -> Result<()> {
    let page = ctx.loader.load_page(feed, offset, limit.max(1)).await?;

    if page.is_empty() {
        println!("No stories in {} at offset {}", feed, offset);
        return Ok(());
    }

    for (i, item) in page.items.iter().enumerate() {
        let Some(post) = render(item) else {
            continue;
        };
        println!("{:>4}. {}", offset + i + 1, post.title);
        if let Some(url) = &post.url {
            println!("      {}", url);
        }
        println!("      {} | {}", post.byline(), post.comments_label(false));
    }

    if page.is_last() {
        println!("\nEnd of {} ({} stories)", feed, page.total);
    } else {
        println!(
            "\nNext page: clonernews list {} --offset {}",
            feed, page.next_offset
        );
    }

    Ok(())
}

pub async fn show_item(ctx: &AppContext, id: ItemId) -> Result<()> {
    let item = ctx.items.fetch_item(id).await?;

    match render_resolved(ctx.items.clone(), &item).await {
        Some(post) => print_post(&post),
        None => println!("Item {} is deleted or dead", id),
    }

    Ok(())
}

fn print_post(post: &PostFragment) {
    println!("{}", post.title);
    if let Some(url) = &post.url {
        println!("{}", url);
    }
    println!("{}", post.byline());

    match &post.content {
        PostContent::Story { text } => {
            if let Some(text) = text {
                println!("\n{}", text);
            }
        }
        PostContent::Job { description } => println!("\n{}", description),
        PostContent::Poll { text, options } => {
            if let Some(text) = text {
                println!("\n{}", text);
            }
            println!();
            for option in options {
                println!("  - {}", option.state.label());
            }
        }
    }

    println!("\n{}", post.comments_label(false));
}

/// Expand the thread of `id` level by level, `depth` levels deep, then print
/// it.
pub async fn show_comments(ctx: &AppContext, id: ItemId, depth: usize) -> Result<()> {
    let mut tree = CommentNode::root(id, 0);
    ctx.comments.toggle(&mut tree, id).await?;

    for level in 1..depth {
        let pending: Vec<ItemId> = tree
            .visible()
            .iter()
            .filter(|node| node.depth == level && node.has_toggle())
            .map(|node| node.id)
            .collect();

        for node in pending {
            if let Err(e) = ctx.comments.toggle(&mut tree, node).await {
                tracing::warn!("Could not expand {}: {}", node, e);
            }
        }
    }

    let visible = tree.visible();
    if visible.is_empty() {
        println!("No comments on {}", id);
        return Ok(());
    }

    for node in visible {
        let Some(fragment) = &node.fragment else {
            continue;
        };
        let pad = " ".repeat(fragment.indent().saturating_sub(2));
        println!("{}{}", pad, fragment.header());
        for line in fragment.text.lines() {
            println!("{}  {}", pad, line);
        }
        if !node.is_expanded() && node.reply_count > 0 {
            println!("{}  [{}]", pad, node.toggle_label());
        }
        println!();
    }

    Ok(())
}

/// Run the update watcher in the foreground until Ctrl+C.
pub async fn watch(ctx: &AppContext, config: &Config, interval: Option<Duration>) -> Result<()> {
    let every = interval.unwrap_or(config.watcher.poll_interval);
    let watcher = UpdateWatcher::new(
        ctx.items.clone(),
        config.watcher.source,
        config.watcher.cooldown,
    );
    let source = watcher.source();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = spawn_update_watcher(Arc::new(Mutex::new(watcher)), every, tx);

    println!(
        "Watching {} every {} (cooldown {}). Press Ctrl+C to stop.",
        source,
        format_interval(every),
        format_interval(config.watcher.cooldown)
    );

    loop {
        tokio::select! {
            notification = rx.recv() => {
                let Some(notification) = notification else {
                    break;
                };
                println!(
                    "[{}] {} (latest: {})",
                    Local::now().format("%H:%M:%S"),
                    notification.message,
                    notification.head
                );
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    handle.stop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::testing::StubFetcher;

    fn thread() -> Arc<StubFetcher> {
        Arc::new(
            StubFetcher::new()
                .with_ids("topstories", &[1])
                .with_story(1, "post", &[2])
                .with_comment(2, "top", &[3])
                .with_comment(3, "reply", &[4])
                .with_comment(4, "deep", &[]),
        )
    }

    #[tokio::test]
    async fn test_show_comments_expands_requested_depth() {
        let stub = thread();
        let ctx = AppContext::with_fetcher(stub.clone(), &Config::default());

        show_comments(&ctx, 1, 2).await.unwrap();
        assert_eq!(stub.request_count("item/3.json"), 1);
        assert_eq!(stub.request_count("item/4.json"), 0);
    }

    #[tokio::test]
    async fn test_list_and_item() {
        let stub = thread();
        let ctx = AppContext::with_fetcher(stub.clone(), &Config::default());

        list_page(&ctx, FeedKind::TopStories, 0, 5).await.unwrap();
        list_page(&ctx, FeedKind::TopStories, 10, 5).await.unwrap();
        show_item(&ctx, 1).await.unwrap();
        assert!(show_item(&ctx, 99).await.is_err());
    }

    #[tokio::test]
    async fn test_zero_limit_still_lists_a_story() {
        let stub = thread();
        let ctx = AppContext::with_fetcher(stub.clone(), &Config::default());

        list_page(&ctx, FeedKind::TopStories, 0, 0).await.unwrap();
        assert_eq!(stub.request_count("item/1.json"), 1);
    }
}
