//! # Clonernews
//!
//! A terminal Hacker News reader.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Normalizer → Loader → Render → Controller → UI
//!                                              ↑
//!                                           Watcher
//! ```
//!
//! - [`fetcher`]: HTTP client for the Firebase item API, with bounded
//!   concurrent fan-out
//! - [`normalizer`]: Turns raw JSON into typed [`Item`](domain::Item)s
//! - [`loader`]: Paginated windows over a feed's id list
//! - [`render`]: Display fragments for posts and comments
//! - [`comments`]: Lazily expanded comment trees
//! - [`watcher`]: Throttled polling for new content
//! - [`controller`]: View state with in-flight guards and stale result
//!   discarding
//! - [`tui`]: Terminal user interface built with ratatui
//!
//! ## Quick Start
//!
//! ```bash
//! # First page of the top stories
//! clonernews list
//!
//! # Second page of Ask HN, ten at a time
//! clonernews list ask --offset 10 -n 10
//!
//! # A thread, two levels deep
//! clonernews comments 8863 --depth 2
//!
//! # Launch TUI
//! clonernews tui
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the fetchers,
/// the feed loader and the comment loader.
pub mod app;

/// Command-line interface using clap.
///
/// - `list [feed]` - Print one page of a feed
/// - `item <id>` - Print a single item
/// - `comments <id>` - Print a comment thread
/// - `watch` - Report new content as it appears
/// - `tui` - Launch the TUI
pub mod cli;

/// Lazily loaded comment trees.
pub mod comments;

/// Configuration management.
///
/// Loads from `~/.config/clonernews/config.toml`, supporting:
/// - API endpoint, timeout and concurrency
/// - Default feed and page size
/// - Update watcher interval and cooldown
/// - Custom colors (named or hex)
/// - Custom keybindings
pub mod config;

/// Front-end independent view state.
///
/// [`ViewController`](controller::ViewController) hands out requests for
/// the caller to run and discards results that arrive after the view has
/// moved on.
pub mod controller;

/// Core domain models.
///
/// - [`Item`](domain::Item): A story, comment, job, poll or poll option
/// - [`FeedKind`](domain::FeedKind): The seven story lists
/// - [`Updates`](domain::Updates): Recently changed items and profiles
pub mod domain;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async transport trait
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`ParallelFetcher`](fetcher::parallel::ParallelFetcher): Concurrent fetching with semaphore
pub mod fetcher;

/// Paginated feed loading.
pub mod loader;

/// JSON normalization into domain types.
pub mod normalizer;

/// Display fragments for posts and comments.
pub mod render;

/// Terminal user interface.
///
/// Sidebar with feeds and headlines, a post list with a load-more row, and
/// the comment thread of the selected post.
///
/// Keybindings: j/k navigate, Tab cycles panes, Enter selects or toggles,
/// c toggles comments, m loads more, o opens in browser, R refreshes, q quits.
pub mod tui;

/// Polling for new content.
///
/// [`UpdateWatcher`](watcher::UpdateWatcher) notices changes with a cooldown,
/// [`spawn_update_watcher`](watcher::spawn_update_watcher) drives it on an
/// interval in the background.
pub mod watcher;
