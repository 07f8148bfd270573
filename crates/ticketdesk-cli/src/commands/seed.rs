//! Initial account seeding.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use ticketdesk_core::{
    user::{
        self,
        model::{NewUser, Role},
    },
    DeskConfig, DeskError,
};
use ticketdesk_store::UserRepository;

use super::open_store;

#[derive(Subcommand)]
pub enum SeedCommands {
    /// Create the administrator account
    Admin,

    /// Create sample student accounts
    Students,
}

const SAMPLE_PASSWORD: &str = "student123";

const SAMPLE_STUDENTS: [(&str, &str, &str, &str); 4] = [
    ("John", "Doe", "123456", "john.doe@student.com"),
    ("Jane", "Smith", "234567", "jane.smith@student.com"),
    ("Michael", "Johnson", "345678", "michael.johnson@student.com"),
    ("Sarah", "Williams", "456789", "sarah.williams@student.com"),
];

fn admin_account() -> NewUser {
    NewUser {
        first_name: "Admin".to_string(),
        last_name: "User".to_string(),
        student_id: "admin123".to_string(),
        password: "admin123".to_string(),
        email: Some("admin@example.com".to_string()),
        course: None,
        role: Role::Admin,
    }
}

/// Create an account unless its id is taken. Returns whether it was created.
async fn create_if_absent<S>(store: &S, account: NewUser) -> Result<bool>
where
    S: UserRepository + ?Sized,
{
    let student_id = account.student_id.clone();
    match user::create_user(store, account).await {
        Ok(created) => {
            println!(
                "{} Created {} {} ({})",
                "✓".green().bold(),
                created.role.as_str(),
                created.full_name().cyan(),
                created.student_id.dimmed()
            );
            Ok(true)
        }
        Err(DeskError::Conflict(_)) => {
            println!("{} {} already exists, skipping", "-".yellow(), student_id);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn execute(cmd: SeedCommands, config: &DeskConfig) -> Result<()> {
    let store = open_store(config).await?;

    match cmd {
        SeedCommands::Admin => {
            create_if_absent(&store, admin_account()).await?;
        }

        SeedCommands::Students => {
            let mut created = 0;
            for (first, last, student_id, email) in SAMPLE_STUDENTS {
                let account = NewUser {
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                    student_id: student_id.to_string(),
                    password: SAMPLE_PASSWORD.to_string(),
                    email: Some(email.to_string()),
                    course: None,
                    role: Role::Student,
                };
                if create_if_absent(&store, account).await? {
                    created += 1;
                }
            }

            let students = user::list_users(&store, Some(Role::Student), None).await?;
            println!();
            println!(
                "{} new, {} student(s) in the store",
                created,
                students.len()
            );
            for student in &students {
                println!("  - {} (ID: {})", student.full_name(), student.student_id);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketdesk_store::MemoryStore;

    #[tokio::test]
    async fn test_seeding_twice_skips_existing() {
        let store = MemoryStore::new();
        assert!(create_if_absent(&store, admin_account()).await.unwrap());
        assert!(!create_if_absent(&store, admin_account()).await.unwrap());

        let admin = user::get_user(&store, "admin123").await.unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.full_name(), "Admin User");
    }
}
