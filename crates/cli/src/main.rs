//! LuxeShopy CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! lux-cli migrate run
//!
//! # List applied and pending migrations
//! lux-cli migrate status
//!
//! # Insert the example catalog into an empty products table
//! lux-cli seed products
//!
//! # Create the admin account, or change its password
//! lux-cli admin create -u admin -p 'a-long-password'
//! lux-cli admin set-password -u admin -p 'another-password'
//!
//! # Check that the database is reachable
//! lux-cli check-db
//! ```
//!
//! All commands read `DATABASE_URL` (or `ADMIN_DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lux-cli")]
#[command(author, version, about = "LuxeShopy CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage the admin account
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Check database connectivity and table counts
    CheckDb,
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Run,
    /// Show which migrations have been applied
    Status,
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert the example catalog if the products table is empty
    Products,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create the admin account
    Create {
        /// Login username
        #[arg(short, long)]
        username: String,

        /// Login password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
    /// Replace the password of an existing account
    SetPassword {
        /// Login username
        #[arg(short, long)]
        username: String,

        /// New password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { action } => match action {
            MigrateAction::Run => commands::migrate::run().await?,
            MigrateAction::Status => commands::migrate::status().await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products => {
                commands::seed::products().await?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::Create { username, password } => {
                commands::admin::create(&username, &password).await?;
            }
            AdminAction::SetPassword { username, password } => {
                commands::admin::set_password(&username, &password).await?;
            }
        },
        Commands::CheckDb => commands::check_db::run().await?,
    }
    Ok(())
}
