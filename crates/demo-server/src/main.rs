//! baton-demo: opens the demo database, runs one sync pass and writes the
//! resulting snapshot as JSON.
//!
//! Logging is controlled by `RUST_LOG`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use demo_connector::{ConnectorConfig, Demo};
use demo_db::DbConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Demo identity connector.
#[derive(Parser, Debug)]
#[command(name = "baton-demo")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Database file to open or create
    #[arg(long, env = "BATON_DB_FILE", default_value = "baton-demo.db")]
    db_file: PathBuf,

    /// Populate the demo dataset if the database is empty
    #[arg(long, env = "BATON_INIT_DB")]
    init_db: bool,

    /// Use a throwaway in-memory database instead of a file
    #[arg(long)]
    in_memory: bool,

    /// Pepper prepended to passwords before hashing
    #[arg(long, env = "BATON_PASSWORD_PEPPER", hide_env_values = true)]
    pepper: Option<String>,

    /// Write the snapshot here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn connector_config(&self) -> ConnectorConfig {
        let db = if self.in_memory {
            DbConfig::memory()
        } else {
            DbConfig::file(&self.db_file)
        };
        ConnectorConfig {
            db,
            init_db: self.init_db,
            pepper: self.pepper.clone(),
            ..ConnectorConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("baton_demo=info".parse()?)
                .add_directive("demo_connector=info".parse()?)
                .add_directive("demo_db=info".parse()?),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting baton-demo");

    let demo = Demo::new(cli.connector_config())
        .await
        .context("failed to open the demo connector")?;
    demo.validate().await.context("database did not respond")?;

    let snapshot = demo.sync().await.context("sync failed")?;
    let json = serde_json::to_string_pretty(&snapshot)?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "Snapshot written");
        }
        None => println!("{json}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn in_memory_flag_selects_memory_engine() {
        let cli = Cli::parse_from(["baton-demo", "--in-memory", "--init-db"]);
        let config = cli.connector_config();
        assert_eq!(config.db.engine, demo_db::DbEngine::Memory);
        assert!(config.init_db);
    }

    #[test]
    fn db_file_defaults_to_demo_file() {
        let cli = Cli::parse_from(["baton-demo"]);
        assert_eq!(cli.db_file, PathBuf::from("baton-demo.db"));
    }
}
