//! User and session models.

use serde::{Deserialize, Serialize};
use ticketdesk_store::UserRow;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Self::Student),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Admin => "admin",
        }
    }

    /// Landing page after login.
    pub fn home_path(&self) -> &'static str {
        match self {
            Self::Student => "/dashboard",
            Self::Admin => "/admin",
        }
    }
}

/// A user account as exposed outside the store. Never carries the password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub student_id: String,
    pub email: Option<String>,
    pub course: Option<String>,
    pub role: Role,
    pub created_at: String,
}

impl User {
    pub fn from_row(row: &UserRow) -> Self {
        Self {
            id: row.id.clone(),
            first_name: row.first_name.clone(),
            last_name: row.last_name.clone(),
            student_id: row.student_id.clone(),
            email: row.email.clone(),
            course: row.course.clone(),
            role: Role::parse(&row.role).unwrap_or(Role::Student),
            created_at: row.created_at.clone(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Student details attached to tickets in admin listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

impl UserSummary {
    pub fn from_row(row: &UserRow) -> Self {
        Self {
            student_id: row.student_id.clone(),
            first_name: row.first_name.clone(),
            last_name: row.last_name.clone(),
            email: row.email.clone(),
        }
    }

    pub fn matches(&self, query: &str) -> bool {
        super::matches_query(&self.student_id, &self.first_name, &self.last_name, query)
    }
}

/// Signup form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub password: String,
    pub email: Option<String>,
}

/// An account created with an explicit role, as the seeding commands do.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub student_id: String,
    pub password: String,
    pub email: Option<String>,
    pub course: Option<String>,
    pub role: Role,
}

/// The authenticated party behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub student_id: String,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins may act on any ticket; students only on their own.
    pub fn can_access(&self, owner_student_id: &str) -> bool {
        self.is_admin() || self.student_id == owner_student_id
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
    pub redirect_url: String,
}
