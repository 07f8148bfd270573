//! Ticket management commands.
//!
//! Changes are written to the store directly and then announced to a
//! running server, if any, so open dashboards pick them up.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use ticketdesk_core::{
    ticket::{self, model::TicketStatus},
    DeskConfig, EventPublisher, TicketEvent, WebNotifier,
};

use super::open_store;
use crate::output;

#[derive(Subcommand)]
pub enum TicketCommands {
    /// List tickets
    List(ListTicketsArgs),

    /// Mark a ticket resolved
    Resolve {
        /// Ticket ID
        id: String,
    },

    /// Set a ticket's status
    Status {
        /// Ticket ID
        id: String,

        /// New status (open, in-progress, resolved, pending)
        status: String,
    },
}

#[derive(Args)]
pub struct ListTicketsArgs {
    /// Only tickets in this status
    #[arg(long)]
    pub status: Option<String>,

    /// Only tickets of this student
    #[arg(long)]
    pub student: Option<String>,
}

pub async fn execute(cmd: TicketCommands, config: &DeskConfig) -> Result<()> {
    let store = open_store(config).await?;

    match cmd {
        TicketCommands::List(args) => {
            let status = match args.status.as_deref() {
                Some(s) => Some(TicketStatus::parse(s).ok_or_else(|| anyhow::anyhow!("Unknown status '{}'", s))?),
                None => None,
            };

            let mut tickets = ticket::list_for_admin(&store, status, None).await?;
            if let Some(student) = args.student.as_deref() {
                tickets.retain(|t| t.ticket.student_id == student);
            }
            output::print_tickets_table(&tickets);
        }

        TicketCommands::Resolve { id } => {
            update_status(&store, config, &id, TicketStatus::Resolved.as_str()).await?;
        }

        TicketCommands::Status { id, status } => {
            update_status(&store, config, &id, &status).await?;
        }
    }

    Ok(())
}

async fn update_status(
    store: &ticketdesk_store::RedisStore,
    config: &DeskConfig,
    id: &str,
    status: &str,
) -> Result<()> {
    let updated = ticket::set_status(store, id, status).await?;
    WebNotifier::with_url(&config.web_url)
        .publish(TicketEvent::updated(&updated))
        .await;

    println!(
        "{} Ticket {} is now {}",
        "✓".green().bold(),
        updated.id.dimmed(),
        output::status_colored(updated.status)
    );
    Ok(())
}
