pub mod commands;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::domain::{FeedKind, ItemId};
use crate::watcher::parse_interval;

#[derive(Parser)]
#[command(name = "clonernews")]
#[command(about = "A terminal Hacker News reader", long_about = None)]
pub struct Cli {
    /// Maximum concurrent item requests (overrides the config file)
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log: Option<PathBuf>,

    /// Config file (default: ~/.config/clonernews/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the TUI
    Tui,
    /// Print one page of a feed
    List {
        /// topstories, newstories, beststories, askstories, showstories,
        /// jobstories or pollstories (short names like "best" work too)
        feed: Option<FeedKind>,

        /// Position of the first story
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Stories per page (default: feed.page_size from the config)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Print a single item, with poll options resolved
    Item {
        id: ItemId,
    },
    /// Print the comment thread of an item
    Comments {
        id: ItemId,

        /// Levels of replies to expand
        #[arg(short, long, default_value_t = 1)]
        depth: usize,
    },
    /// Poll for new content and print a line for each change
    Watch {
        /// Poll interval (e.g. "5s", "1m"; default: watcher.poll_interval)
        #[arg(short, long, value_parser = parse_interval)]
        interval: Option<Duration>,
    },
}
