//! Store connection check.

use anyhow::Result;
use colored::Colorize;
use ticketdesk_core::DeskConfig;

use super::open_store;

pub async fn execute(config: &DeskConfig) -> Result<()> {
    println!("Connecting to {}...", config.redis_url.dimmed());
    let store = open_store(config).await?;
    store.ping().await?;
    println!("{} Connected to the ticket store", "✓".green().bold());
    Ok(())
}
