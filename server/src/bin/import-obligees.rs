//! # Obligee importer
//!
//! Loads the directory of obligees from a JSON array such as
//!
//! ```json
//! [{"name": "Úrad vlády", "street": "Námestie slobody 1", "city": "Bratislava",
//!   "zip": "81370", "emails": ["urad@vlada.gov.sk"], "score": 10}]
//! ```
//!
//! into the portal database. `score` is optional.

use std::path::PathBuf;

use anyhow::Context;
use chcemvediet_server::{
    db::{clients::sqlite::SqliteClient, interface::DatabaseClient},
    models::ObligeeCreate,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about = "Import obligees into the chcemvediet database")]
struct Args {
    /// SQLite database path or `sqlite:` URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// JSON file with the obligees
    #[arg(long)]
    file: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let contents = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let obligees: Vec<ObligeeCreate> = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a list of obligees", args.file.display()))?;

    let db = SqliteClient::open(&args.database_url)
        .await
        .context("failed to open database")?;
    for obligee in &obligees {
        db.create_obligee(obligee)
            .await
            .with_context(|| format!("failed to import {}", obligee.name))?;
    }
    info!("imported {} obligees", obligees.len());
    Ok(())
}
