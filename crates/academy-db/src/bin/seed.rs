//! # Seed Tool
//!
//! Opens a database, runs the Seeder, and prints what each store holds.
//!
//! ## Usage
//! ```bash
//! # Seed the database from the platform data dir (or academy.toml)
//! cargo run -p academy-db --bin seed
//!
//! # Specify database path
//! cargo run -p academy-db --bin seed -- --db ./data/academy.db
//!
//! # Use a specific config file
//! cargo run -p academy-db --bin seed -- --config ./academy.toml
//! ```
//!
//! Running it again is harmless: a database that already has articles is
//! left untouched.

use academy_db::{seed_database, AppConfig, DatabaseCell, SeedOutcome};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Academy Seed Tool");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>        Database file path (default: platform data dir)");
                println!("  -c, --config <PATH>    Config file (default: platform config dir)");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            other => eprintln!("Ignoring unknown argument: {other}"),
        }
        i += 1;
    }

    let mut config = AppConfig::load(config_path)?;
    if db_path.is_some() {
        config.database.path = db_path;
    }
    let db_config = config.db_config()?;

    println!("🌱 Academy Seed Tool");
    println!("====================");
    match &db_config.database_path {
        Some(path) => println!("Database: {}", path.display()),
        None => println!("Database: (in memory)"),
    }
    println!();

    let cell = DatabaseCell::new(db_config);
    let db = cell.open().await?;
    println!("✓ Opened database (schema v{})", db.schema_version().await?);

    match seed_database(&db).await? {
        SeedOutcome::AlreadySeeded => {
            println!("⚠ Database already has articles");
            println!("  Skipping seed to avoid duplicates.");
            println!("  Delete the database file to regenerate.");
        }
        SeedOutcome::Seeded {
            articles,
            podcasts,
            videos,
        } => {
            println!(
                "✓ Seeded {} articles, {} podcast episodes, {} videos",
                articles, podcasts, videos
            );
        }
    }

    let counts = db.content_counts().await?;
    let settings = db.settings().get().await?;

    println!();
    println!("Store counts:");
    println!("  articles: {}", counts.articles);
    println!("  podcasts: {}", counts.podcasts);
    println!("  videos:   {}", counts.videos);
    println!("  leads:    {}", counts.leads);
    println!("  settings: {}", u8::from(settings.is_some()));

    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=academy=trace` - Show trace for academy crates only
/// - Default: INFO, DEBUG for academy crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,academy=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
