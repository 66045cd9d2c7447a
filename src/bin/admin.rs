//! CLI administration tool for the PostgreSQL-backed shortener.
//!
//! Creates and inspects mappings directly against the database, using the
//! same derivation and collision rules as the HTTP service.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL (or print its existing code)
//! cargo run --bin admin -- shorten https://example.com/page
//!
//! # Shorten with a custom code
//! cargo run --bin admin -- shorten https://example.com/page --code promo
//!
//! # Resolve a code
//! cargo run --bin admin -- resolve 4LzVq1b
//!
//! # Recent mappings and totals
//! cargo run --bin admin -- list --limit 20
//! cargo run --bin admin -- stats
//!
//! # Database tools
//! cargo run --bin admin -- db check
//! cargo run --bin admin -- db migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`, or `DB_HOST`/`DB_PORT`/`DB_USER`/`DB_PASSWORD`/`DB_NAME`
//! - `BASE_URL` (optional): prefix for printed short URLs

use hashed_url_shortener::application::services::{ShortenerError, ShortenerService};
use hashed_url_shortener::config::Config;
use hashed_url_shortener::domain::repositories::UrlStore;
use hashed_url_shortener::infrastructure::persistence::PgUrlStore;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing hashed-url-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Shorten a URL, printing its existing code if it already has one
    Shorten {
        /// The URL to shorten, stored exactly as given
        url: String,

        /// Use a custom code instead of the derived one
        #[arg(short, long)]
        code: Option<String>,
    },

    /// Print the original URL behind a short code
    Resolve {
        /// The short code
        code: String,
    },

    /// List the most recent mappings
    List {
        /// Maximum number of mappings to show
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = Config::load_database_url()?;
    let base_url =
        std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    let store = Arc::new(PgUrlStore::new(Arc::new(pool.clone())));
    let shortener = ShortenerService::new(store);

    match cli.command {
        Commands::Shorten { url, code } => {
            shorten(&shortener, &base_url, &url, code.as_deref()).await?
        }
        Commands::Resolve { code } => resolve(&shortener, &code).await?,
        Commands::List { limit } => list(&shortener, limit).await?,
        Commands::Stats => stats(&shortener).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    pool.close().await;

    Ok(())
}

/// Creates or fetches the code for a URL.
async fn shorten(
    shortener: &ShortenerService<PgUrlStore>,
    base_url: &str,
    url: &str,
    custom_code: Option<&str>,
) -> Result<()> {
    let result = match custom_code {
        Some(code) => shortener.shorten_with_code(url, code).await,
        None => shortener.shorten(url).await,
    };

    match result {
        Ok(code) => {
            println!("{}", "Short link ready".green().bold());
            println!();
            println!("  URL:       {}", url.cyan());
            println!("  Code:      {}", code.bright_yellow().bold());
            println!(
                "  Short URL: {}",
                shortener.short_url(base_url, &code).bright_white()
            );
            println!();
            Ok(())
        }
        Err(e) => Err(shorten_failure(e)),
    }
}

/// Wraps a shortening failure so the process exits with a non-zero status.
fn shorten_failure(e: ShortenerError) -> anyhow::Error {
    anyhow::Error::new(e).context("Failed to shorten URL")
}

/// Prints the original URL of a code.
async fn resolve(shortener: &ShortenerService<PgUrlStore>, code: &str) -> Result<()> {
    match shortener.resolve(code).await {
        Ok(url) => {
            println!("  {} -> {}", code.bright_yellow(), url.cyan());
            Ok(())
        }
        Err(ShortenerError::NotFound { .. }) => {
            println!("{}", format!("  No mapping for '{}'", code).yellow());
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e)),
    }
}

/// Lists recent mappings.
///
/// # Output Format
///
/// ```text
///   Code         Created              URL
///   ──────────────────────────────────────────────────────────────
///   4LzVq1b      2024-01-15 10:30     https://example.com/page
/// ```
async fn list(shortener: &ShortenerService<PgUrlStore>, limit: u32) -> Result<()> {
    let mappings = shortener
        .store()
        .list_recent(limit)
        .await
        .context("Failed to list mappings")?;

    if mappings.is_empty() {
        println!("{}", "  No mappings found".yellow());
        return Ok(());
    }

    println!(
        "  {:<12} {:<20} {}",
        "Code".bright_white().bold(),
        "Created".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for mapping in &mappings {
        println!(
            "  {:<12} {:<20} {}",
            mapping.short_code.bright_yellow(),
            mapping
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            mapping.original_url.cyan()
        );
    }

    println!();
    println!(
        "  Shown: {}",
        mappings.len().to_string().bright_white().bold()
    );

    Ok(())
}

/// Displays mapping totals.
async fn stats(shortener: &ShortenerService<PgUrlStore>) -> Result<()> {
    let count = shortener
        .store()
        .count()
        .await
        .context("Failed to count mappings")?;

    println!("{}", "Statistics".bright_blue().bold());
    println!();
    println!("  Mappings: {}", count.to_string().bright_green().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Migrate => {
            sqlx::migrate!("./migrations")
                .run(pool)
                .await
                .context("Failed to apply migrations")?;

            println!("{}", "Migrations applied".green().bold());
        }
    }

    Ok(())
}
