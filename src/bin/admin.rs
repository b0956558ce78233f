//! CLI administration tool for linkhop.
//!
//! Manages user accounts directly against the database, without requiring
//! the HTTP API or an existing admin credential. This is also how the first
//! account is bootstrapped.
//!
//! # Usage
//!
//! ```bash
//! # Create a user (password prompted; --admin for an admin account)
//! cargo run --bin admin -- user create alice
//!
//! # List all users
//! cargo run --bin admin -- user list
//!
//! # Change a password
//! cargo run --bin admin -- user passwd alice
//!
//! # Flip the admin flag
//! cargo run --bin admin -- user toggle-admin alice
//!
//! # Delete a user (asks for confirmation)
//! cargo run --bin admin -- user delete alice
//!
//! # Check database connectivity
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use linkhop::domain::repositories::UserRepository;
use linkhop::infrastructure::persistence::PgUserRepository;
use linkhop::utils::password::hash_password;
use linkhop::utils::validation::{validate_password_strength, validate_username};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Password};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing linkhop.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Database tools
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a user; the password is prompted
    Create {
        username: String,
        /// Grant admin privileges
        #[arg(long)]
        admin: bool,
    },
    /// List all users
    List,
    /// Change a user's password
    Passwd { username: String },
    /// Flip a user's admin flag
    ToggleAdmin { username: String },
    /// Delete a user
    Delete { username: String },
}

#[derive(Subcommand)]
enum DbCommands {
    /// Verify the database is reachable and migrated
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::User { command } => {
            let users = PgUserRepository::new(Arc::new(pool));
            run_user_command(&users, command).await
        }
        Commands::Db { command } => run_db_command(&pool, command).await,
    }
}

async fn run_user_command(users: &PgUserRepository, command: UserCommands) -> Result<()> {
    match command {
        UserCommands::Create { username, admin } => {
            validate_username(&username).map_err(validation_failed)?;

            let password = Password::new()
                .with_prompt("Password")
                .with_confirmation("Confirm password", "Passwords do not match")
                .interact()?;
            validate_password_strength(&password).map_err(validation_failed)?;

            let user = users.create(&username, &hash_password(&password)).await;
            let user = match user {
                Ok(user) => user,
                Err(e) => bail!("failed to create user: {e:?}"),
            };

            if admin {
                users
                    .toggle_admin(&user.username)
                    .await
                    .map_err(|e| anyhow::anyhow!("failed to set admin flag: {e:?}"))?;
            }

            println!(
                "{} user {} created{}",
                "ok:".green().bold(),
                user.username.bold(),
                if admin { " (admin)" } else { "" }
            );
        }
        UserCommands::List => {
            let all = users
                .list()
                .await
                .map_err(|e| anyhow::anyhow!("failed to list users: {e:?}"))?;

            if all.is_empty() {
                println!("{}", "no users yet".dimmed());
                return Ok(());
            }

            for user in all {
                let marker = if user.is_admin {
                    "admin".yellow().bold().to_string()
                } else {
                    "user".normal().to_string()
                };
                println!(
                    "{:24} {:6} created {}",
                    user.username.bold(),
                    marker,
                    user.created_at.format("%Y-%m-%d")
                );
            }
        }
        UserCommands::Passwd { username } => {
            let password = Password::new()
                .with_prompt("New password")
                .with_confirmation("Confirm password", "Passwords do not match")
                .interact()?;
            validate_password_strength(&password).map_err(validation_failed)?;

            users
                .update_password(&username, &hash_password(&password))
                .await
                .map_err(|e| anyhow::anyhow!("failed to update password: {e:?}"))?;

            println!("{} password updated for {}", "ok:".green().bold(), username.bold());
        }
        UserCommands::ToggleAdmin { username } => {
            users
                .toggle_admin(&username)
                .await
                .map_err(|e| anyhow::anyhow!("failed to toggle admin: {e:?}"))?;

            println!("{} admin flag toggled for {}", "ok:".green().bold(), username.bold());
        }
        UserCommands::Delete { username } => {
            let confirmed = Confirm::new()
                .with_prompt(format!("Delete user '{username}' and all their links?"))
                .default(false)
                .interact()?;

            if !confirmed {
                println!("{}", "aborted".dimmed());
                return Ok(());
            }

            let removed = users
                .delete(&username)
                .await
                .map_err(|e| anyhow::anyhow!("failed to delete user: {e:?}"))?;

            if removed {
                println!("{} user {} deleted", "ok:".green().bold(), username.bold());
            } else {
                println!("{} no such user: {}", "error:".red().bold(), username.bold());
            }
        }
    }

    Ok(())
}

async fn run_db_command(pool: &PgPool, command: DbCommands) -> Result<()> {
    match command {
        DbCommands::Check => {
            sqlx::query("SELECT 1")
                .execute(pool)
                .await
                .context("database ping failed")?;

            let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                .fetch_one(pool)
                .await
                .context("users table missing; run the server once to migrate")?;
            let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
                .fetch_one(pool)
                .await
                .context("links table missing; run the server once to migrate")?;

            println!(
                "{} database reachable ({} users, {} links)",
                "ok:".green().bold(),
                users,
                links
            );
        }
    }

    Ok(())
}

fn validation_failed(e: linkhop::AppError) -> anyhow::Error {
    anyhow::anyhow!("{e:?}")
}
