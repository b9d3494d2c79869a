//! Embedded SurrealDB connection management.

use std::path::PathBuf;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, SurrealKv};
use tracing::info;

use crate::error::DbError;

/// Storage engine backing the embedded database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbEngine {
    /// Volatile in-process store; contents are lost on exit.
    Memory,
    /// Persistent SurrealKV store at the given path.
    File(PathBuf),
}

/// Configuration for opening the embedded database.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub engine: DbEngine,
    /// SurrealDB namespace.
    pub namespace: String,
    /// SurrealDB database name.
    pub database: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            engine: DbEngine::File(PathBuf::from("baton-demo.db")),
            namespace: "baton".into(),
            database: "demo".into(),
        }
    }
}

impl DbConfig {
    /// In-memory configuration, used by tests and throwaway runs.
    pub fn memory() -> Self {
        Self {
            engine: DbEngine::Memory,
            ..Self::default()
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            engine: DbEngine::File(path.into()),
            ..Self::default()
        }
    }
}

/// Owns a handle to the embedded SurrealDB instance.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Db>,
}

impl DbManager {
    /// Open the embedded database and select the configured namespace
    /// and database.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        let db = match &config.engine {
            DbEngine::Memory => {
                info!("Opening in-memory database");
                Surreal::new::<Mem>(()).await?
            }
            DbEngine::File(path) => {
                info!(path = %path.display(), "Opening database file");
                Surreal::new::<SurrealKv>(path.to_string_lossy().into_owned()).await?
            }
        };

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!(
            namespace = %config.namespace,
            database = %config.database,
            "Database ready"
        );

        Ok(Self { db })
    }

    /// Returns a reference to the underlying SurrealDB client.
    pub fn client(&self) -> &Surreal<Db> {
        &self.db
    }

    /// Round-trip a trivial statement through the engine.
    pub async fn ping(&self) -> Result<(), DbError> {
        self.db
            .query("RETURN true")
            .await?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;
        Ok(())
    }
}
