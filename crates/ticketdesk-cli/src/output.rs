//! Terminal output formatting.

use colored::{ColoredString, Colorize};
use ticketdesk_core::ticket::model::{AdminTicket, TicketStatus};
use ticketdesk_core::user::model::{Role, User};

/// Status with its display colour.
pub fn status_colored(status: TicketStatus) -> ColoredString {
    match status {
        TicketStatus::Open => status.as_str().normal(),
        TicketStatus::InProgress => status.as_str().yellow(),
        TicketStatus::Pending => status.as_str().cyan(),
        TicketStatus::Resolved => status.as_str().green(),
    }
}

/// Print tickets as a table.
pub fn print_tickets_table(tickets: &[AdminTicket]) {
    if tickets.is_empty() {
        println!("{}", "No tickets found.".dimmed());
        return;
    }

    println!(
        "{:<10} {:<10} {:<20} {:<12} {:<12} {:<30}",
        "ID", "Student", "Name", "Type", "Status", "Description"
    );
    println!("{}", "─".repeat(98));

    for entry in tickets {
        let ticket = &entry.ticket;
        let name = entry
            .user
            .as_ref()
            .map(|u| format!("{} {}", u.first_name, u.last_name))
            .unwrap_or_default();

        println!(
            "{:<10} {:<10} {:<20} {:<12} {:<12} {:<30}",
            short_id(&ticket.id),
            ticket.student_id,
            truncate(name.trim(), 18),
            ticket.complaint_type.as_str(),
            status_colored(ticket.status),
            truncate(&ticket.description, 28)
        );
    }

    println!();
    println!("{} ticket(s) total", tickets.len());
}

/// Print accounts as a table.
pub fn print_users_table(users: &[User]) {
    if users.is_empty() {
        println!("{}", "No accounts found.".dimmed());
        return;
    }

    println!("{:<12} {:<24} {:<8} {:<30}", "Student ID", "Name", "Role", "Email");
    println!("{}", "─".repeat(76));

    for user in users {
        let role = match user.role {
            Role::Admin => "admin".magenta(),
            Role::Student => "student".normal(),
        };
        println!(
            "{:<12} {:<24} {:<8} {:<30}",
            user.student_id,
            truncate(&user.full_name(), 22),
            role,
            user.email.as_deref().unwrap_or("-")
        );
    }

    println!();
    println!("{} account(s) total", users.len());
}

/// Print a single account.
pub fn print_user(user: &User) {
    println!("{} {}", user.full_name().cyan().bold(), format!("({})", user.student_id).dimmed());
    println!("{}: {}", "Role".bold(), user.role.as_str());
    println!("{}: {}", "Email".bold(), user.email.as_deref().unwrap_or("-"));
    if let Some(course) = &user.course {
        println!("{}: {}", "Course".bold(), course);
    }
    println!("{}: {}", "Created".bold(), user.created_at);
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Truncate a string to `max` characters, marking the cut with "...".
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
