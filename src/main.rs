mod api;
mod catalog;
mod config;
mod songinfo;
mod storage;

use anyhow::Context;
use catalog::{SongFilter, SongRepository, SongRequest};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "songbook", version, about = "Song catalog with lyrics")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// Override the listen address from the config.
        #[arg(long)]
        addr: Option<String>,
    },
    /// List catalog entries to stdout (headless).
    Songs {
        #[arg(long)]
        group: Option<String>,
        #[arg(long)]
        song: Option<String>,
        #[arg(long)]
        limit: Option<String>,
        #[arg(long)]
        offset: Option<String>,
    },
    /// Ask the song info service about a song and dump the JSON (headless).
    Lookup { group: String, song: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut cfg = config::load(cli.config.as_deref()).context("load config")?;
    if let Some(Command::Serve { addr: Some(addr) }) = &cli.command {
        cfg.server.addr = addr.clone();
    }
    cfg.validate().context("invalid config")?;

    let level = cfg.log_level()?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .init();

    match cli.command.unwrap_or(Command::Serve { addr: None }) {
        Command::Serve { .. } => {
            let addr: SocketAddr = cfg.server.addr.parse().context("parse server.addr")?;
            let repo = storage::SqliteSongRepository::open(
                &cfg.storage.database,
                cfg.storage.pool_size,
            )
            .context("open storage")?;
            info!(database = %cfg.storage.database.display(), "storage ready");

            let info = songinfo::SongInfoClient::new(&cfg.lookup.base_url, cfg.lookup_timeout())?;
            let state = api::AppState::new(Arc::new(repo), info);
            api::serve(state, addr, cfg.request_timeout()).await?;
        }
        Command::Songs {
            group,
            song,
            limit,
            offset,
        } => {
            let repo = storage::SqliteSongRepository::open(&cfg.storage.database, 1)
                .context("open storage")?;
            let filter = SongFilter::from_query(
                group.as_deref(),
                song.as_deref(),
                limit.as_deref(),
                offset.as_deref(),
            );
            let songs = repo.list(&filter).context("list songs")?;
            for s in &songs {
                println!(
                    "{:>4}. {} - {}  ({})  {}",
                    s.id, s.group_name, s.song_name, s.release_date, s.link
                );
            }
        }
        Command::Lookup { group, song } => {
            let client = songinfo::SongInfoClient::new(&cfg.lookup.base_url, cfg.lookup_timeout())?;
            let detail = client
                .fetch(&SongRequest {
                    group_name: group,
                    song_name: song,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&detail)?);
        }
    }

    Ok(())
}
