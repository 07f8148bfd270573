//! Ticket domain models.

use serde::{Deserialize, Serialize};
use ticketdesk_store::{CommentRow, TicketRow};

use crate::user::model::UserSummary;

/// A student complaint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub student_id: String,
    pub complaint_type: ComplaintType,
    pub description: String,
    pub status: TicketStatus,
    pub comments: Vec<Comment>,
    pub created_at: String,
    pub updated_at: String,
}

impl Ticket {
    /// Create a Ticket from a stored document.
    ///
    /// Unknown stored values fall back to `other` / `open`.
    pub fn from_row(row: TicketRow) -> Self {
        Self {
            complaint_type: ComplaintType::parse(&row.complaint_type).unwrap_or(ComplaintType::Other),
            status: TicketStatus::parse(&row.status).unwrap_or(TicketStatus::Open),
            comments: row.comments.into_iter().map(Comment::from_row).collect(),
            id: row.id,
            student_id: row.student_id,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    pub fn to_row(&self) -> TicketRow {
        TicketRow {
            id: self.id.clone(),
            student_id: self.student_id.clone(),
            complaint_type: self.complaint_type.as_str().to_string(),
            description: self.description.clone(),
            status: self.status.as_str().to_string(),
            comments: self.comments.iter().map(Comment::to_row).collect(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }
}

/// A comment on a ticket. Comments are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub author_id: String,
    pub content: String,
    pub is_admin_comment: bool,
    pub created_at: String,
}

impl Comment {
    pub fn from_row(row: CommentRow) -> Self {
        Self {
            author_id: row.author_id,
            content: row.content,
            is_admin_comment: row.is_admin_comment,
            created_at: row.created_at,
        }
    }

    pub fn to_row(&self) -> CommentRow {
        CommentRow {
            author_id: self.author_id.clone(),
            content: self.content.clone(),
            is_admin_comment: self.is_admin_comment,
            created_at: self.created_at.clone(),
        }
    }
}

/// Complaint category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintType {
    Bullying,
    Cafeteria,
    Grade,
    Academic,
    Technical,
    Administrative,
    Facility,
    Other,
}

impl ComplaintType {
    pub const ALL: [ComplaintType; 8] = [
        Self::Bullying,
        Self::Cafeteria,
        Self::Grade,
        Self::Academic,
        Self::Technical,
        Self::Administrative,
        Self::Facility,
        Self::Other,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bullying => "bullying",
            Self::Cafeteria => "cafeteria",
            Self::Grade => "grade",
            Self::Academic => "academic",
            Self::Technical => "technical",
            Self::Administrative => "administrative",
            Self::Facility => "facility",
            Self::Other => "other",
        }
    }
}

/// Ticket status. Any status may be set from any other; only the UI
/// reserves `resolved` for administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Pending,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [Self::Open, Self::InProgress, Self::Resolved, Self::Pending];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in-progress",
            Self::Resolved => "resolved",
            Self::Pending => "pending",
        }
    }

    /// Resolved tickets no longer accept content edits.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

/// Fields a ticket is created from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub complaint_type: String,
    #[serde(default)]
    pub description: String,
}

/// Changes to an existing ticket. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketEdit {
    pub complaint_type: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl TicketEdit {
    pub fn touches_content(&self) -> bool {
        self.complaint_type.is_some() || self.description.is_some()
    }
}

/// A ticket as listed for administrators, joined with its student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminTicket {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub user: Option<UserSummary>,
}
