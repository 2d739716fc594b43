mod commands;
mod config;
mod session;
mod terminal;

use std::{
    io::{self, Stdout},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{EntryFactory, NavigationController, Timeline};
use storage::{BlobStore, EntryStore, MemoryBlobStore, SqliteBlobStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{load_settings, prepare_database_url},
    session::{Flow, Session},
    terminal::TerminalPresenter,
};

#[derive(Parser, Debug)]
#[command(name = "captains-log", about = "A personal log of text, image, audio and video entries")]
struct Args {
    /// Config file; defaults to ./captains_log.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// SQLite url or file path for the entry store.
    #[arg(long)]
    database_url: Option<String>,
    /// Keep entries in memory only; nothing is written to disk.
    #[arg(long)]
    memory: bool,
    #[arg(long)]
    log_level: Option<String>,
    /// Minutes east of UTC for timeline dates.
    #[arg(long, allow_hyphen_values = true)]
    utc_offset_minutes: Option<i32>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(v) = args.database_url {
        settings.database_url = v;
    }
    if let Some(v) = args.log_level {
        settings.log_level = v;
    }
    if let Some(v) = args.utc_offset_minutes {
        settings.timezone_offset_minutes = Some(v);
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let blobs: Arc<dyn BlobStore> = if args.memory {
        info!("using in-memory entry store");
        Arc::new(MemoryBlobStore::new())
    } else {
        let database_url = prepare_database_url(&settings.database_url);
        info!(%database_url, "opening entry store");
        Arc::new(SqliteBlobStore::new(&database_url).await?)
    };
    let store = EntryStore::open(blobs).await;

    let timeline = match settings.timeline_offset()? {
        Some(offset) => Timeline::new(offset),
        None => Timeline::local(),
    };
    let controller = NavigationController::new(
        store,
        EntryFactory::default(),
        timeline,
        TerminalPresenter::new(io::stdout()),
    );

    run(Session::new(controller)).await
}

async fn run(mut session: Session<Stdout>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        session.prompt();
        let Some(line) = lines.next_line().await.context("failed to read input")? else {
            break;
        };
        if session.handle_line(&line).await == Flow::Quit {
            break;
        }
    }
    info!(entries = session.controller().store().len(), "log closed");
    Ok(())
}
