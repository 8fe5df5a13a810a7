use std::fs::File;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use clonernews::app::AppContext;
use clonernews::cli::{commands, Cli, Commands};
use clonernews::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal, so logs go to a file when one is given.
    match &cli.log {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
                .with(EnvFilter::from_default_env())
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(EnvFilter::from_default_env())
                .init();
        }
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(workers) = cli.workers {
        config.api.max_concurrency = workers.max(1);
    }

    let ctx = AppContext::new(&config)?;

    match cli.command {
        Commands::List {
            feed,
            offset,
            limit,
        } => {
            let feed = feed.unwrap_or(config.feed.default_feed);
            let limit = limit.unwrap_or(config.feed.page_size);
            commands::list_page(&ctx, feed, offset, limit).await?;
        }
        Commands::Item { id } => {
            commands::show_item(&ctx, id).await?;
        }
        Commands::Comments { id, depth } => {
            commands::show_comments(&ctx, id, depth).await?;
        }
        Commands::Watch { interval } => {
            commands::watch(&ctx, &config, interval).await?;
        }
        Commands::Tui => {
            clonernews::tui::run(Arc::new(ctx), Arc::new(config)).await?;
        }
    }

    Ok(())
}
