//! Accounts and login sessions.

pub mod model;

use chrono::Utc;
use std::time::Duration;
use ticketdesk_store::{SessionRepository, SessionRow, StoreError, UserRepository, UserRow};
use uuid::Uuid;

use crate::error::{DeskError, DeskResult};
use model::{Caller, LoginOutcome, NewUser, Role, SignupRequest, User};

pub const PASSWORD_MIN_CHARS: usize = 6;

/// Case-insensitive match of `query` against a student id or "first last".
pub fn matches_query(student_id: &str, first_name: &str, last_name: &str, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    let name = format!("{} {}", first_name, last_name).to_lowercase();
    student_id.to_lowercase().contains(&query) || name.contains(&query)
}

fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

fn check_password(password: &str, errors: &mut Vec<String>) {
    if password.is_empty() {
        errors.push("Password is required".to_string());
    } else if password.chars().count() < PASSWORD_MIN_CHARS {
        errors.push(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_CHARS
        ));
    }
}

fn check_email(email: Option<&str>, errors: &mut Vec<String>) {
    if let Some(email) = email.filter(|e| !e.is_empty()) {
        if !looks_like_email(email) {
            errors.push("Please enter a valid email".to_string());
        }
    }
}

/// Create an account with an explicit role.
///
/// Student accounts need a numeric student id; admin ids are free-form.
pub async fn create_user<S>(store: &S, new: NewUser) -> DeskResult<User>
where
    S: UserRepository + ?Sized,
{
    let mut errors = Vec::new();
    let student_id = new.student_id.trim().to_string();
    if student_id.is_empty() {
        errors.push("Student ID is required".to_string());
    } else if new.role == Role::Student && !student_id.chars().all(|c| c.is_ascii_digit()) {
        errors.push("Student ID must contain only numbers".to_string());
    }
    if new.first_name.trim().is_empty() {
        errors.push("First name is required".to_string());
    }
    check_password(&new.password, &mut errors);
    check_email(new.email.as_deref(), &mut errors);
    if !errors.is_empty() {
        return Err(DeskError::Validation(errors));
    }

    let now = Utc::now().to_rfc3339();
    let row = UserRow {
        id: Uuid::new_v4().to_string(),
        first_name: new.first_name.trim().to_string(),
        last_name: new.last_name.trim().to_string(),
        student_id,
        password: new.password,
        email: new.email.filter(|e| !e.is_empty()),
        course: new.course,
        role: new.role.as_str().to_string(),
        created_at: now.clone(),
        updated_at: now,
    };

    store.insert_user(&row).await.map_err(|e| match e {
        StoreError::Conflict(_) => {
            DeskError::Conflict("An account with this Student ID already exists".to_string())
        }
        e => e.into(),
    })?;

    tracing::info!(student_id = %row.student_id, role = %row.role, "Account created");
    Ok(User::from_row(&row))
}

/// Self-service student signup. The name is split into first and last on
/// the first space.
pub async fn signup<S>(store: &S, req: &SignupRequest) -> DeskResult<User>
where
    S: UserRepository + ?Sized,
{
    let name = req.name.trim();
    if name.is_empty() || req.student_id.trim().is_empty() || req.password.is_empty() {
        return Err(DeskError::validation(
            "Name, Student ID, and password are required",
        ));
    }

    let (first_name, last_name) = name.split_once(' ').unwrap_or((name, ""));
    create_user(
        store,
        NewUser {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            student_id: req.student_id.clone(),
            password: req.password.clone(),
            email: req.email.clone(),
            course: None,
            role: Role::Student,
        },
    )
    .await
}

/// Look up an account by student id.
pub async fn get_user<S>(store: &S, student_id: &str) -> DeskResult<User>
where
    S: UserRepository + ?Sized,
{
    let row = store.get_user(student_id).await.map_err(|e| match e {
        StoreError::NotFound(_) => DeskError::UserNotFound(student_id.to_string()),
        e => e.into(),
    })?;
    Ok(User::from_row(&row))
}

/// List accounts, optionally by role and search query.
pub async fn list_users<S>(store: &S, role: Option<Role>, query: Option<&str>) -> DeskResult<Vec<User>>
where
    S: UserRepository + ?Sized,
{
    let users = store
        .list_users()
        .await?
        .iter()
        .map(User::from_row)
        .filter(|u| role.is_none_or(|r| u.role == r))
        .filter(|u| query.is_none_or(|q| matches_query(&u.student_id, &u.first_name, &u.last_name, q)))
        .collect();
    Ok(users)
}

/// Check credentials and open a session.
pub async fn login<S>(store: &S, student_id: &str, password: &str, ttl: Duration) -> DeskResult<LoginOutcome>
where
    S: UserRepository + SessionRepository + ?Sized,
{
    let row = match store.get_user(student_id.trim()).await {
        Ok(row) => row,
        Err(StoreError::NotFound(_)) => {
            return Err(DeskError::InvalidCredentials(
                "No account found with this Student ID".to_string(),
            ))
        }
        Err(e) => return Err(e.into()),
    };

    if row.password != password {
        return Err(DeskError::InvalidCredentials("Incorrect password".to_string()));
    }

    let user = User::from_row(&row);
    let session = SessionRow {
        token: Uuid::new_v4().to_string(),
        student_id: user.student_id.clone(),
        role: user.role.as_str().to_string(),
        created_at: Utc::now().to_rfc3339(),
    };
    store.put_session(&session, ttl).await?;

    tracing::info!(student_id = %user.student_id, role = user.role.as_str(), "Login successful");
    Ok(LoginOutcome {
        token: session.token,
        redirect_url: user.role.home_path().to_string(),
        user,
    })
}

/// Resolve a session token to the caller behind it.
pub async fn resolve_session<S>(store: &S, token: &str) -> DeskResult<Caller>
where
    S: SessionRepository + ?Sized,
{
    let session = store.get_session(token).await?.ok_or(DeskError::Unauthorized)?;
    let role = Role::parse(&session.role).ok_or(DeskError::Unauthorized)?;
    Ok(Caller {
        student_id: session.student_id,
        role,
    })
}

/// Close a session. Unknown tokens are ignored.
pub async fn logout<S>(store: &S, token: &str) -> DeskResult<()>
where
    S: SessionRepository + ?Sized,
{
    store.delete_session(token).await?;
    Ok(())
}
