//! # huddle
//!
//! Command-line front end for the huddle client core.
//!
//! - **import**: seed the local SQLite replica from a JSON snapshot
//! - **export**: dump the replica back out as a JSON snapshot
//! - **channels**: the current user's channels, validated, de-duplicated
//!   and split into sections
//! - **available-dms**: users the current user has no direct message with
//! - **search**: the sigil-aware search over the replica
//! - **presence**: feed presence events from stdin into the presence state
//!   machine and print the writes it makes

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use huddle_channels::{get_available_users_for_new_dm, prepare_channels};
use huddle_presence::{spawn_presence, MemoryPresenceStore, PresenceCache, PresenceEvent};
use huddle_search::{SearchAggregator, UserDirectory};
use huddle_shared::UserId;
use huddle_store::{Database, DocumentStore, Snapshot, SqliteDocumentStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::HuddleConfig;

#[derive(Debug, Parser)]
#[command(name = "huddle", version, about = "Channels, search and presence for huddle")]
struct Cli {
    /// SQLite replica path (overrides HUDDLE_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Current user id (overrides HUDDLE_USER)
    #[arg(long, short, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a JSON snapshot into the replica
    Import { file: PathBuf },

    /// Write the replica as a JSON snapshot (stdout when no file is given)
    Export { file: Option<PathBuf> },

    /// Print the current user's channels by section
    Channels,

    /// Print users available for a new direct message
    AvailableDms,

    /// Search the replica; `#term` for channels, `@term` for users
    Search {
        term: String,

        /// Print a flat list of tagged results instead of categories
        #[arg(long)]
        flat: bool,
    },

    /// Read presence events from stdin, one per line
    ///
    /// Besides event names (login, online, offline, focus, blur, visible,
    /// hidden, activity, unload, logout) two directives are understood:
    /// `wait <secs>` and `disconnect`.
    Presence,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,huddle=info,huddle_presence=debug")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = HuddleConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(user) = cli.user {
        config.current_user = Some(UserId::new(user));
    }
    info!(?config, "Loaded configuration");

    match cli.command {
        Command::Import { file } => import(&config, &file),
        Command::Export { file } => export(&config, file.as_deref()),
        Command::Channels => channels(&config).await,
        Command::AvailableDms => available_dms(&config).await,
        Command::Search { term, flat } => search(&config, &term, flat).await,
        Command::Presence => presence(&config).await,
    }
}

fn open_store(config: &HuddleConfig) -> anyhow::Result<SqliteDocumentStore> {
    Ok(SqliteDocumentStore::new(Database::open_at(&config.db_path)?))
}

fn import(config: &HuddleConfig, file: &Path) -> anyhow::Result<()> {
    let snapshot = Snapshot::from_json(&std::fs::read_to_string(file)?)?;
    if snapshot.is_empty() {
        warn!(file = %file.display(), "Snapshot is empty");
    }

    let db = Database::open_at(&config.db_path)?;
    db.import_snapshot(&snapshot)?;
    Ok(())
}

fn export(config: &HuddleConfig, file: Option<&Path>) -> anyhow::Result<()> {
    let db = Database::open_at(&config.db_path)?;
    let json = db.export_snapshot()?.to_json()?;

    match file {
        Some(file) => {
            std::fs::write(file, json)?;
            info!(file = %file.display(), "Snapshot exported");
        }
        None => println!("{json}"),
    }
    Ok(())
}

async fn channels(config: &HuddleConfig) -> anyhow::Result<()> {
    let uid = config.require_user()?;
    let store = open_store(config)?;

    let mine = store.channels_for_member(uid).await?;
    let sections = prepare_channels(&mine, uid);
    println!("{}", serde_json::to_string_pretty(&sections)?);
    Ok(())
}

async fn available_dms(config: &HuddleConfig) -> anyhow::Result<()> {
    let uid = config.require_user()?;
    let store = open_store(config)?;

    let users = store.list_users().await?;
    let sections = prepare_channels(&store.channels_for_member(uid).await?, uid);

    let mut dms = sections.direct_message_channels;
    dms.extend(sections.self_channel);

    for user in get_available_users_for_new_dm(&users, &dms, uid) {
        println!("{}\t{}", user.uid, user.user_name);
    }
    Ok(())
}

async fn search(config: &HuddleConfig, term: &str, flat: bool) -> anyhow::Result<()> {
    let uid = config.require_user()?.clone();
    let store: Arc<dyn DocumentStore> = Arc::new(open_store(config)?);

    // no live presence source here; statuses come back unknown
    let presence = Arc::new(PresenceCache::new());
    let directory = Arc::new(UserDirectory::new(Arc::clone(&store)));
    let aggregator = SearchAggregator::new(store, directory, presence, uid);

    let results = aggregator.search(term).await;
    info!(hits = results.total(), "Search finished");

    let out = if flat {
        serde_json::to_string_pretty(&results.into_results())?
    } else {
        serde_json::to_string_pretty(&results)?
    };
    println!("{out}");
    Ok(())
}

async fn presence(config: &HuddleConfig) -> anyhow::Result<()> {
    let uid = config.require_user()?.clone();
    let store = Arc::new(MemoryPresenceStore::new());
    let handle = spawn_presence(Arc::clone(&store), uid.clone(), config.presence);

    let mut printed = 0;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(secs) = line.strip_prefix("wait") {
            match secs.trim().parse::<f64>() {
                Ok(secs) if secs >= 0.0 => tokio::time::sleep(Duration::from_secs_f64(secs)).await,
                _ => warn!(line, "Expected `wait <secs>`"),
            }
        } else if line == "disconnect" {
            if let Some(status) = store.disconnect(&uid) {
                println!("{uid} -> {status} (disconnect rule)");
            }
        } else {
            match line.parse::<PresenceEvent>() {
                Ok(event) => handle.send(event).await?,
                Err(e) => warn!(error = %e, "Skipping line"),
            }
        }

        settle().await;
        print_new_writes(&store, &mut printed);
    }

    handle.shutdown().await;
    settle().await;
    print_new_writes(&store, &mut printed);

    if let Some(record) = store.snapshot().get(&uid) {
        println!("final: {} (last seen {})", record.status, record.last_seen.to_rfc3339());
    }
    Ok(())
}

/// Give the driver's spawned store calls a moment to land.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

fn print_new_writes(store: &MemoryPresenceStore, printed: &mut usize) {
    let log = store.write_log();
    for (uid, status) in log.iter().skip(*printed) {
        println!("{uid} -> {status}");
    }
    *printed = log.len();
}
