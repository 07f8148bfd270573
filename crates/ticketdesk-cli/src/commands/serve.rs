//! Web server command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use ticketdesk_core::DeskConfig;
use ticketdesk_store::{MemoryStore, Store};
use ticketdesk_web::AppState;

use super::open_store;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "TICKETDESK_PORT")]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "TICKETDESK_HOST")]
    pub host: Option<String>,

    /// Keep everything in memory instead of Redis
    #[arg(long)]
    pub memory: bool,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file path (with --log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

pub async fn execute(args: ServeArgs, mut config: DeskConfig) -> Result<()> {
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }

    let (store, backend): (Arc<dyn Store>, String) = if args.memory {
        tracing::warn!("Using the in-memory store, data is lost on exit");
        (Arc::new(MemoryStore::new()), "memory".to_string())
    } else {
        let store = open_store(&config).await?;
        store.ping().await?;
        (Arc::new(store), config.redis_url.clone())
    };

    let state = AppState::new(store, &config);
    let addr = config.bind_addr();

    println!();
    println!("  {} {}", "Ticketdesk".cyan().bold(), "Web Server".bold());
    println!();
    println!("  {}        http://{}/api", "API".green(), addr);
    println!("  {}  ws://{}/api/socketio", "WebSocket".green(), addr);
    println!("  {}      {}", "Store".green(), backend);
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    ticketdesk_web::run_server(state, &addr).await
}
