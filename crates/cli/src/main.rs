//! Nightbloom CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! nb-cli migrate
//!
//! # Seed the catalog with sample data
//! nb-cli seed
//!
//! # Record a staff role in the local mirror
//! nb-cli role grant -u <uid> -e admin@example.com -r admin
//! nb-cli role revoke -u <uid>
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the catalog with sample products and categories
//! - `role` - Manage the local staff role mirror

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "nb-cli")]
#[command(author, version, about = "Nightbloom CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog with sample products and categories
    Seed,
    /// Manage the local staff role mirror
    Role {
        #[command(subcommand)]
        action: RoleAction,
    },
}

#[derive(Subcommand)]
enum RoleAction {
    /// Record a staff membership
    Grant {
        /// Provider account UID
        #[arg(short, long)]
        uid: String,

        /// Account email, stored alongside the UID
        #[arg(short, long)]
        email: String,

        /// Role (`admin` or `moderator`)
        #[arg(short, long, default_value = "admin")]
        role: String,
    },
    /// Remove a staff membership
    Revoke {
        /// Provider account UID
        #[arg(short, long)]
        uid: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::Role { action } => match action {
            RoleAction::Grant { uid, email, role } => {
                commands::role::grant(&uid, &email, &role).await?;
            }
            RoleAction::Revoke { uid } => commands::role::revoke(&uid).await?,
        },
    }
    Ok(())
}
