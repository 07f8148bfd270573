//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use ticketdesk_core::DeskConfig;
use ticketdesk_store::RedisStore;

pub mod check;
pub mod seed;
pub mod serve;
pub mod ticket;
pub mod user;
pub mod watch;

/// Ticketdesk - student complaint desk
#[derive(Parser)]
#[command(name = "ticketdesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML config file (defaults to ./ticketdesk.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Redis connection URL
    #[arg(long, global = true, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server and notification channel
    Serve(serve::ServeArgs),

    /// Create initial accounts
    #[command(subcommand)]
    Seed(seed::SeedCommands),

    /// Account management
    #[command(subcommand)]
    User(user::UserCommands),

    /// Ticket management
    #[command(subcommand)]
    Ticket(ticket::TicketCommands),

    /// Follow live ticket notifications from a running server
    Watch(watch::WatchArgs),

    /// Test the store connection
    Check,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let mut config = DeskConfig::load(self.config.as_deref())?;
        if let Some(url) = self.redis_url {
            config.redis_url = url;
        }
        if self.verbose {
            tracing::debug!(?config, "Resolved configuration");
        }

        match self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Seed(cmd) => seed::execute(cmd, &config).await,
            Commands::User(cmd) => user::execute(cmd, &config).await,
            Commands::Ticket(cmd) => ticket::execute(cmd, &config).await,
            Commands::Watch(args) => watch::execute(args, &config).await,
            Commands::Check => check::execute(&config).await,
        }
    }
}

/// Connect to the configured Redis store.
pub async fn open_store(config: &DeskConfig) -> Result<RedisStore> {
    RedisStore::connect(&config.redis_url)
        .await
        .with_context(|| format!("Could not connect to Redis at {}", config.redis_url))
}
