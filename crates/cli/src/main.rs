//! Helpdesk CLI - Database migrations and admin management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! hd-cli migrate
//!
//! # Create an admin account
//! hd-cli admin create -n "Admin Name" -e admin@example.com -p 'a-long-password'
//!
//! # Show open-ticket load per admin
//! hd-cli admin loads
//! ```
//!
//! # Environment Variables
//!
//! - `HELPDESK_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hd-cli")]
#[command(author, version, about = "Helpdesk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
    /// Show each admin's open-ticket count and who is next in line
    Loads,
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
        Commands::Admin { action } => match action {
            AdminAction::Create {
                name,
                email,
                password,
            } => {
                commands::admin::create(&name, &email, &password).await?;
            }
            AdminAction::Loads => commands::admin::loads().await?,
        },
    }
    Ok(())
}
