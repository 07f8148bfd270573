//! Ticket management.

pub mod model;

use std::collections::HashMap;

use chrono::Utc;
use ticketdesk_store::{StoreError, TicketRepository, UserRepository};
use uuid::Uuid;

use crate::error::{DeskError, DeskResult};
use crate::user::model::UserSummary;
use model::{AdminTicket, Comment, ComplaintType, NewTicket, Ticket, TicketEdit, TicketStatus};

pub const DESCRIPTION_MIN_CHARS: usize = 10;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

fn not_found(id: &str) -> impl FnOnce(StoreError) -> DeskError + '_ {
    move |e| match e {
        StoreError::NotFound(_) => DeskError::TicketNotFound(id.to_string()),
        e => e.into(),
    }
}

fn check_complaint_type(value: &str, errors: &mut Vec<String>) -> Option<ComplaintType> {
    let value = value.trim();
    if value.is_empty() {
        errors.push("Complaint type is required".to_string());
        return None;
    }
    let parsed = ComplaintType::parse(value);
    if parsed.is_none() {
        errors.push("Invalid complaint type".to_string());
    }
    parsed
}

fn check_description(value: &str, errors: &mut Vec<String>) -> Option<String> {
    let value = value.trim();
    let chars = value.chars().count();
    if chars == 0 {
        errors.push("Description is required".to_string());
    } else if chars < DESCRIPTION_MIN_CHARS {
        errors.push(format!(
            "Description must be at least {} characters long",
            DESCRIPTION_MIN_CHARS
        ));
    } else if chars > DESCRIPTION_MAX_CHARS {
        errors.push(format!(
            "Description cannot exceed {} characters",
            DESCRIPTION_MAX_CHARS
        ));
    } else {
        return Some(value.to_string());
    }
    None
}

fn check_status(value: &str, errors: &mut Vec<String>) -> Option<TicketStatus> {
    let parsed = TicketStatus::parse(value.trim());
    if parsed.is_none() {
        errors.push("Invalid status".to_string());
    }
    parsed
}

/// Create a new ticket in the `open` status.
///
/// All validation failures are reported together.
pub async fn create_ticket<S>(store: &S, new: &NewTicket) -> DeskResult<Ticket>
where
    S: TicketRepository + ?Sized,
{
    let mut errors = Vec::new();
    let student_id = new.student_id.trim();
    if student_id.is_empty() {
        errors.push("Student ID is required".to_string());
    }
    let complaint_type = check_complaint_type(&new.complaint_type, &mut errors);
    let description = check_description(&new.description, &mut errors);

    let (Some(complaint_type), Some(description)) = (complaint_type, description) else {
        return Err(DeskError::Validation(errors));
    };
    if !errors.is_empty() {
        return Err(DeskError::Validation(errors));
    }

    let now = Utc::now().to_rfc3339();
    let ticket = Ticket {
        id: Uuid::new_v4().to_string(),
        student_id: student_id.to_string(),
        complaint_type,
        description,
        status: TicketStatus::Open,
        comments: Vec::new(),
        created_at: now.clone(),
        updated_at: now,
    };

    store.insert_ticket(&ticket.to_row()).await?;
    tracing::debug!(ticket_id = %ticket.id, student_id = %ticket.student_id, "Ticket created");
    Ok(ticket)
}

/// Get a ticket by ID.
pub async fn get_ticket<S>(store: &S, id: &str) -> DeskResult<Ticket>
where
    S: TicketRepository + ?Sized,
{
    let row = store.get_ticket(id).await.map_err(not_found(id))?;
    Ok(Ticket::from_row(row))
}

/// List a student's tickets, newest first.
pub async fn list_for_student<S>(store: &S, student_id: &str) -> DeskResult<Vec<Ticket>>
where
    S: TicketRepository + ?Sized,
{
    let student_id = student_id.trim();
    if student_id.is_empty() {
        return Err(DeskError::validation("Student ID is required"));
    }
    let rows = store.list_tickets_by_student(student_id).await?;
    Ok(rows.into_iter().map(Ticket::from_row).collect())
}

/// List every ticket for administrators, newest first, joined with the
/// submitting student.
///
/// `query` matches case-insensitively against the student id or the
/// student's full name.
pub async fn list_for_admin<S>(
    store: &S,
    status: Option<TicketStatus>,
    query: Option<&str>,
) -> DeskResult<Vec<AdminTicket>>
where
    S: TicketRepository + UserRepository + ?Sized,
{
    let rows = match status {
        Some(status) => store.list_tickets_by_status(status.as_str()).await?,
        None => store.list_tickets().await?,
    };

    let users: HashMap<String, UserSummary> = store
        .list_users()
        .await?
        .into_iter()
        .map(|row| (row.student_id.clone(), UserSummary::from_row(&row)))
        .collect();

    let query = query.map(str::trim).filter(|q| !q.is_empty());

    let listed = rows
        .into_iter()
        .map(|row| {
            let user = users.get(&row.student_id).cloned();
            AdminTicket {
                ticket: Ticket::from_row(row),
                user,
            }
        })
        .filter(|entry| match query {
            None => true,
            Some(q) => match &entry.user {
                Some(user) => user.matches(q),
                None => crate::user::matches_query(&entry.ticket.student_id, "", "", q),
            },
        })
        .collect();

    Ok(listed)
}

/// Apply an edit to a ticket.
///
/// Content fields (`complaintType`, `description`) cannot change once the
/// ticket is resolved; status changes are always allowed.
pub async fn edit_ticket<S>(store: &S, id: &str, edit: &TicketEdit) -> DeskResult<Ticket>
where
    S: TicketRepository + ?Sized,
{
    let mut errors = Vec::new();
    let complaint_type = edit
        .complaint_type
        .as_deref()
        .and_then(|v| check_complaint_type(v, &mut errors));
    let description = edit
        .description
        .as_deref()
        .and_then(|v| check_description(v, &mut errors));
    let status = edit.status.as_deref().and_then(|v| check_status(v, &mut errors));
    if !errors.is_empty() {
        return Err(DeskError::Validation(errors));
    }

    let mut ticket = get_ticket(store, id).await?;
    if edit.touches_content() && ticket.status.is_terminal() {
        return Err(DeskError::TicketClosed(ticket.id));
    }

    if let Some(complaint_type) = complaint_type {
        ticket.complaint_type = complaint_type;
    }
    if let Some(description) = description {
        ticket.description = description;
    }
    if let Some(status) = status {
        ticket.status = status;
    }
    ticket.updated_at = Utc::now().to_rfc3339();

    store.save_ticket(&ticket.to_row()).await.map_err(not_found(id))?;
    Ok(ticket)
}

/// Set a ticket's status.
pub async fn set_status<S>(store: &S, id: &str, status: &str) -> DeskResult<Ticket>
where
    S: TicketRepository + ?Sized,
{
    let mut errors = Vec::new();
    let Some(status) = check_status(status, &mut errors) else {
        return Err(DeskError::Validation(errors));
    };

    let mut ticket = get_ticket(store, id).await?;
    ticket.status = status;
    ticket.updated_at = Utc::now().to_rfc3339();
    store.save_ticket(&ticket.to_row()).await.map_err(not_found(id))?;
    Ok(ticket)
}

/// Delete a ticket.
pub async fn delete_ticket<S>(store: &S, id: &str) -> DeskResult<()>
where
    S: TicketRepository + ?Sized,
{
    if store.delete_ticket(id).await? {
        Ok(())
    } else {
        Err(DeskError::TicketNotFound(id.to_string()))
    }
}

/// Append a comment to a ticket.
pub async fn add_comment<S>(
    store: &S,
    id: &str,
    author_id: &str,
    content: &str,
    is_admin_comment: bool,
) -> DeskResult<Comment>
where
    S: TicketRepository + ?Sized,
{
    let content = content.trim();
    if content.is_empty() {
        return Err(DeskError::validation("Comment content is required"));
    }

    let mut ticket = get_ticket(store, id).await?;
    let comment = Comment {
        author_id: author_id.to_string(),
        content: content.to_string(),
        is_admin_comment,
        created_at: Utc::now().to_rfc3339(),
    };
    ticket.comments.push(comment.clone());
    ticket.updated_at = comment.created_at.clone();
    store.save_ticket(&ticket.to_row()).await.map_err(not_found(id))?;
    Ok(comment)
}

/// List a ticket's comments in the order they were added.
pub async fn list_comments<S>(store: &S, id: &str) -> DeskResult<Vec<Comment>>
where
    S: TicketRepository + ?Sized,
{
    Ok(get_ticket(store, id).await?.comments)
}
