pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::{mpsc, Mutex};

use crate::app::{AppContext, Result};
use crate::config::Config;
use crate::controller::{ExpandRequest, PageOutcome, PageRequest, RepliesOutcome, ViewController};
use crate::domain::ItemId;
use crate::render::resolve_poll_options;
use crate::watcher::{spawn_update_watcher, UpdateWatcher};

use self::app::{ActivePane, TuiApp};
use self::event::{Action, AppEvent, AppMessage, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;
type MessageTx = mpsc::UnboundedSender<AppMessage>;

pub async fn run(ctx: Arc<AppContext>, config: Arc<Config>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx, config).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(terminal: &mut Tui, ctx: Arc<AppContext>, config: Arc<Config>) -> Result<()> {
    let controller = ViewController::new(config.feed.default_feed, config.feed.page_size);
    let mut tui_app = TuiApp::new(controller, config.watcher.banner);
    let event_handler = EventHandler::new(Duration::from_millis(100));

    let (tx, mut rx) = mpsc::unbounded_channel::<AppMessage>();
    let (notify_tx, mut notify_rx) = mpsc::unbounded_channel();

    // Keep the handle alive for the whole session; dropping it stops polling.
    let _watcher = config.watcher.enabled.then(|| {
        let watcher = UpdateWatcher::new(
            ctx.items.clone(),
            config.watcher.source,
            config.watcher.cooldown,
        );
        spawn_update_watcher(
            Arc::new(Mutex::new(watcher)),
            config.watcher.poll_interval,
            notify_tx.clone(),
        )
    });

    if let Some(request) = tui_app.controller.load_more() {
        spawn_page(&ctx, &tx, request);
    }
    spawn_headlines(&ctx, &tx, &config);

    loop {
        while let Ok(message) = rx.try_recv() {
            handle_message(&mut tui_app, &ctx, &tx, message);
        }
        while let Ok(notification) = notify_rx.try_recv() {
            tui_app.show_banner(notification.message, Instant::now());
        }

        terminal.draw(|frame| layout::render(frame, &mut tui_app, &config.colors))?;
        tui_app.on_frame(Instant::now());

        if let AppEvent::Key(key) = event_handler.next()? {
            let action = config.keybindings.get_action(&key);
            handle_action(&mut tui_app, &ctx, &config, &tx, action);
        }

        if tui_app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_action(tui_app: &mut TuiApp, ctx: &AppContext, config: &Config, tx: &MessageTx, action: Action) {
    match action {
        Action::Quit => {
            tui_app.should_quit = true;
        }
        Action::MoveUp => {
            tui_app.move_up();
        }
        Action::MoveDown => {
            tui_app.move_down();
        }
        Action::NextPane => {
            tui_app.active_pane = tui_app.active_pane.next();
        }
        Action::PrevPane => {
            tui_app.active_pane = tui_app.active_pane.prev();
        }
        Action::Select => match tui_app.active_pane {
            ActivePane::Feeds => {
                let feed = tui_app.selected_feed();
                let request = tui_app.controller.switch_feed(feed);
                spawn_page(ctx, tx, request);
                tui_app.reset_post_selection();
                tui_app.set_status(format!("Loading {}...", feed.label()));
                tui_app.active_pane = ActivePane::Posts;
            }
            ActivePane::Posts => {
                if tui_app.is_load_more_selected() {
                    load_more(tui_app, ctx, tx);
                } else if tui_app.selected_post().is_some() {
                    tui_app.active_pane = ActivePane::Thread;
                }
            }
            ActivePane::Thread => {
                let post = tui_app.selected_post().map(|p| p.id);
                if let (Some(post), Some(node)) = (post, tui_app.selected_thread_node()) {
                    toggle(tui_app, ctx, tx, post, node);
                }
            }
        },
        Action::LoadMore => {
            load_more(tui_app, ctx, tx);
        }
        Action::ToggleComments => {
            if let Some(post) = tui_app.selected_post().map(|p| p.id) {
                toggle(tui_app, ctx, tx, post, post);
            }
        }
        Action::OpenInBrowser => {
            if let Some(post) = tui_app.selected_post() {
                let link = post
                    .url
                    .clone()
                    .unwrap_or_else(|| format!("https://news.ycombinator.com/item?id={}", post.id));
                if let Err(e) = open::that(&link) {
                    tui_app.set_status(format!("Failed to open browser: {}", e));
                }
            }
        }
        Action::Refresh => {
            if !tui_app.refresh_throttle.try_fire(Instant::now()) {
                tui_app.set_status("Already refreshed a moment ago".to_string());
                return;
            }
            let request = tui_app.controller.refresh();
            spawn_page(ctx, tx, request);
            spawn_headlines(ctx, tx, config);
            tui_app.dismiss_banner();
            tui_app.reset_post_selection();
            tui_app.set_status("Refreshing...".to_string());
        }
        Action::Dismiss => {
            tui_app.dismiss_banner();
            tui_app.clear_status();
        }
        Action::None => {}
    }
}

fn load_more(tui_app: &mut TuiApp, ctx: &AppContext, tx: &MessageTx) {
    match tui_app.controller.load_more() {
        Some(request) => {
            spawn_page(ctx, tx, request);
            tui_app.set_status("Loading more stories...".to_string());
        }
        None if tui_app.controller.session().exhausted => {
            tui_app.set_status("No more stories".to_string());
        }
        None => {}
    }
}

fn toggle(tui_app: &mut TuiApp, ctx: &AppContext, tx: &MessageTx, post: ItemId, node: ItemId) {
    if let Some(request) = tui_app.controller.toggle_comments(post, node) {
        spawn_replies(ctx, tx, request);
    }
    tui_app.clamp_selection();
}

fn handle_message(tui_app: &mut TuiApp, ctx: &AppContext, tx: &MessageTx, message: AppMessage) {
    match message {
        AppMessage::PageLoaded(request, result) => {
            match tui_app.controller.apply_page(request, result) {
                PageOutcome::Appended {
                    count,
                    pending_polls,
                } => {
                    for (post, options) in pending_polls {
                        spawn_poll_options(ctx, tx, post, options);
                    }
                    tui_app.set_status(format!(
                        "{} stories from {}",
                        tui_app.controller.posts().len(),
                        request.feed.label()
                    ));
                    tracing::debug!("Appended {} posts", count);
                }
                PageOutcome::Exhausted => {
                    tui_app.set_status("No more stories".to_string());
                }
                PageOutcome::Failed(e) => {
                    tui_app.set_status(format!("Failed to load stories: {}", e));
                }
                PageOutcome::Stale => {}
            }
            tui_app.clamp_selection();
        }
        AppMessage::RepliesLoaded(request, result) => {
            if let RepliesOutcome::Failed(e) = tui_app.controller.apply_replies(request, result) {
                tui_app.set_status(format!("Failed to load comments: {}", e));
            }
            tui_app.clamp_selection();
        }
        AppMessage::PollOptionLoaded {
            post,
            option,
            result,
        } => {
            tui_app.controller.apply_poll_option(post, option, result);
        }
        AppMessage::HeadlinesLoaded(result) => match result {
            Ok(items) => tui_app.headlines = items,
            Err(e) => {
                tracing::warn!("Loading headlines failed: {}", e);
            }
        },
    }
}

fn spawn_page(ctx: &AppContext, tx: &MessageTx, request: PageRequest) {
    let loader = ctx.loader.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = request.execute(&loader).await;
        let _ = tx.send(AppMessage::PageLoaded(request, result));
    });
}

fn spawn_replies(ctx: &AppContext, tx: &MessageTx, request: ExpandRequest) {
    let comments = ctx.comments.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = request.execute(&comments).await;
        let _ = tx.send(AppMessage::RepliesLoaded(request, result));
    });
}

fn spawn_poll_options(ctx: &AppContext, tx: &MessageTx, post: ItemId, options: Vec<ItemId>) {
    let mut resolved = resolve_poll_options(ctx.items.clone(), &options);
    let tx = tx.clone();
    tokio::spawn(async move {
        while let Some((option, result)) = resolved.next().await {
            let _ = tx.send(AppMessage::PollOptionLoaded {
                post,
                option,
                result,
            });
        }
    });
}

fn spawn_headlines(ctx: &AppContext, tx: &MessageTx, config: &Config) {
    let loader = ctx.loader.clone();
    let tx = tx.clone();
    let feed = config.feed.headline_feed;
    let count = config.feed.headline_count;
    tokio::spawn(async move {
        let result = loader.load_headlines(feed, count).await;
        let _ = tx.send(AppMessage::HeadlinesLoaded(result));
    });
}
