//! Live notification viewer.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use futures::StreamExt;
use serde_json::Value;
use ticketdesk_core::{wire, DeskConfig, FeedChange, TicketFeed};
use tokio_tungstenite::{connect_async, tungstenite::Message};

#[derive(Args)]
pub struct WatchArgs {
    /// WebSocket URL (defaults to the configured server)
    #[arg(long)]
    pub url: Option<String>,
}

/// Channel endpoint for a server base URL.
fn socket_url(web_url: &str) -> String {
    let base = web_url.trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    };
    format!("{}/api/socketio", base)
}

fn describe(ticket: &Value) -> String {
    let field = |name: &str| ticket.get(name).and_then(Value::as_str).unwrap_or("-").to_string();
    format!(
        "{} {} {}",
        wire::ticket_id(ticket).unwrap_or("-").dimmed(),
        field("studentId"),
        field("status").yellow()
    )
}

fn show(feed: &mut TicketFeed, text: &str) {
    match feed.apply_frame(text) {
        Ok(FeedChange::Ignored) => {}
        Ok(change) => {
            let ticket = match &change {
                FeedChange::Inserted(t) | FeedChange::Replaced(t) => describe(t),
                FeedChange::Ignored => String::new(),
            };
            if let Some(toast) = change.toast() {
                println!("{} {}", "●".green(), toast.bold());
                println!("  {}", ticket);
            }
        }
        Err(e) => tracing::warn!(error = %e, "Ignoring malformed frame"),
    }
}

pub async fn execute(args: WatchArgs, config: &DeskConfig) -> Result<()> {
    let url = args.url.unwrap_or_else(|| socket_url(&config.web_url));
    let (mut socket, _) = connect_async(url.as_str())
        .await
        .with_context(|| format!("Could not connect to {}", url))?;

    println!("{} Watching {}", "✓".green().bold(), url.dimmed());
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    // Nothing is fetched up front, so updates show only for tickets created
    // while watching.
    let mut feed = TicketFeed::subscribed(Vec::new());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            msg = socket.next() => match msg {
                Some(Ok(Message::Text(text))) => show(&mut feed, &text),
                Some(Ok(Message::Close(_))) | None => {
                    println!("{}", "Server closed the connection".dimmed());
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("WebSocket connection failed"),
            },
        }
    }

    println!("{} ticket(s) seen", feed.len());
    Ok(())
}
