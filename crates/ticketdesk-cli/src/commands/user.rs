//! Account management commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use ticketdesk_core::{
    user::{
        self,
        model::{NewUser, Role},
    },
    DeskConfig, DeskError,
};

use super::open_store;
use crate::output;

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create an account
    Create(CreateUserArgs),

    /// List accounts
    List(ListUsersArgs),

    /// Show whether an account exists and what it looks like
    Verify {
        /// Student ID to look up
        student_id: String,
    },
}

#[derive(Args)]
pub struct CreateUserArgs {
    /// Student ID (numeric for students)
    pub student_id: String,

    /// First name
    #[arg(long)]
    pub first_name: String,

    /// Last name
    #[arg(long, default_value = "")]
    pub last_name: String,

    /// Password
    #[arg(long)]
    pub password: String,

    /// Email address
    #[arg(long)]
    pub email: Option<String>,

    /// Course
    #[arg(long)]
    pub course: Option<String>,

    /// Create an administrator instead of a student
    #[arg(long)]
    pub admin: bool,
}

#[derive(Args)]
pub struct ListUsersArgs {
    /// Only this role (student, admin)
    #[arg(long)]
    pub role: Option<String>,

    /// Match student id or name
    #[arg(short, long)]
    pub query: Option<String>,
}

pub async fn execute(cmd: UserCommands, config: &DeskConfig) -> Result<()> {
    let store = open_store(config).await?;

    match cmd {
        UserCommands::Create(args) => {
            let role = if args.admin { Role::Admin } else { Role::Student };
            let created = user::create_user(
                &store,
                NewUser {
                    first_name: args.first_name,
                    last_name: args.last_name,
                    student_id: args.student_id,
                    password: args.password,
                    email: args.email,
                    course: args.course,
                    role,
                },
            )
            .await?;

            println!(
                "{} Created {} {} ({})",
                "✓".green().bold(),
                created.role.as_str(),
                created.full_name().cyan(),
                created.student_id.dimmed()
            );
        }

        UserCommands::List(args) => {
            let role = match args.role.as_deref() {
                Some(r) => Some(
                    Role::parse(r).ok_or_else(|| anyhow::anyhow!("Unknown role '{}' (student, admin)", r))?,
                ),
                None => None,
            };
            let users = user::list_users(&store, role, args.query.as_deref()).await?;
            output::print_users_table(&users);
        }

        UserCommands::Verify { student_id } => match user::get_user(&store, &student_id).await {
            Ok(found) => output::print_user(&found),
            Err(DeskError::UserNotFound(_)) => {
                println!("{} No account found with Student ID {}", "✗".red().bold(), student_id);
            }
            Err(e) => return Err(e.into()),
        },
    }

    Ok(())
}
