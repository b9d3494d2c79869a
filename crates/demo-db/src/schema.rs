//! Schema definitions and migration runner for SurrealDB.
//!
//! All tables use SCHEMAFULL mode. UUIDs are stored as strings.
//! Multi-valued relationships live in child tables with one row per
//! pair; each row's record id is derived from the pair and a UNIQUE
//! index on the pair backs it up, so a pair can only be stored once.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_name ON TABLE user COLUMNS name UNIQUE;

-- =======================================================================
-- Passwords (record id = user id, at most one per user)
-- =======================================================================
DEFINE TABLE password SCHEMAFULL;
DEFINE FIELD user_id ON TABLE password TYPE string;
DEFINE FIELD password_hash ON TABLE password TYPE string;
DEFINE FIELD updated_at ON TABLE password TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_password_user ON TABLE password COLUMNS user_id UNIQUE;

-- =======================================================================
-- Groups
-- =======================================================================
DEFINE TABLE group SCHEMAFULL;
DEFINE FIELD name ON TABLE group TYPE string;
DEFINE FIELD created_at ON TABLE group TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_group_name ON TABLE group COLUMNS name UNIQUE;

DEFINE TABLE group_admin SCHEMAFULL;
DEFINE FIELD group_id ON TABLE group_admin TYPE string;
DEFINE FIELD user_id ON TABLE group_admin TYPE string;
DEFINE FIELD granted_at ON TABLE group_admin TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_group_admin_pair ON TABLE group_admin \
    COLUMNS group_id, user_id UNIQUE;

DEFINE TABLE group_member SCHEMAFULL;
DEFINE FIELD group_id ON TABLE group_member TYPE string;
DEFINE FIELD user_id ON TABLE group_member TYPE string;
DEFINE FIELD granted_at ON TABLE group_member TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_group_member_pair ON TABLE group_member \
    COLUMNS group_id, user_id UNIQUE;

-- =======================================================================
-- Roles
-- =======================================================================
DEFINE TABLE role SCHEMAFULL;
DEFINE FIELD name ON TABLE role TYPE string;
DEFINE FIELD created_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_name ON TABLE role COLUMNS name UNIQUE;

DEFINE TABLE role_user SCHEMAFULL;
DEFINE FIELD role_id ON TABLE role_user TYPE string;
DEFINE FIELD user_id ON TABLE role_user TYPE string;
DEFINE FIELD granted_at ON TABLE role_user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_user_pair ON TABLE role_user \
    COLUMNS role_id, user_id UNIQUE;

DEFINE TABLE role_group SCHEMAFULL;
DEFINE FIELD role_id ON TABLE role_group TYPE string;
DEFINE FIELD group_id ON TABLE role_group TYPE string;
DEFINE FIELD granted_at ON TABLE role_group TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_group_pair ON TABLE role_group \
    COLUMNS role_id, group_id UNIQUE;

-- =======================================================================
-- Projects
-- =======================================================================
DEFINE TABLE project SCHEMAFULL;
DEFINE FIELD name ON TABLE project TYPE string;
DEFINE FIELD owner ON TABLE project TYPE string;
DEFINE FIELD created_at ON TABLE project TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_project_name ON TABLE project COLUMNS name UNIQUE;

DEFINE TABLE project_group SCHEMAFULL;
DEFINE FIELD project_id ON TABLE project_group TYPE string;
DEFINE FIELD group_id ON TABLE project_group TYPE string;
DEFINE FIELD granted_at ON TABLE project_group TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_project_group_pair ON TABLE project_group \
    COLUMNS project_id, group_id UNIQUE;

-- =======================================================================
-- Seed marker
-- =======================================================================
DEFINE TABLE _seed SCHEMAFULL;
DEFINE FIELD applied_at ON TABLE _seed TYPE datetime \
    DEFAULT time::now();
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Bring `db` up to the latest schema version.
///
/// Each pending migration runs in one transaction together with the
/// `_migration` row that records it, so a version is either fully applied
/// and recorded or neither.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let applied = applied_version(db).await?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > applied).collect();
    if pending.is_empty() {
        debug!(version = applied, "Schema up to date");
        return Ok(());
    }

    for migration in pending {
        info!(version = migration.version, name = migration.name, "Applying migration");
        db.query(migration.transaction())
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!("v{} '{}': {e}", migration.version, migration.name))
            })?;
    }

    info!(version = applied_version(db).await?, "Schema migrated");
    Ok(())
}

async fn applied_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    let mut result = db
        .query("SELECT version, name FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    Ok(records.first().map(|m| m.version).unwrap_or(0))
}

impl Migration {
    fn transaction(&self) -> String {
        format!(
            "BEGIN TRANSACTION;\n{}\nCREATE _migration SET version = $version, name = $name;\n\
             COMMIT TRANSACTION;",
            self.sql
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn migration_records_itself_inside_its_transaction() {
        let sql = MIGRATIONS[0].transaction();
        assert!(sql.starts_with("BEGIN TRANSACTION;"));
        let record = sql.find("CREATE _migration").unwrap();
        assert!(record > sql.find("DEFINE TABLE user").unwrap());
        assert!(sql.trim_end().ends_with("COMMIT TRANSACTION;"));
    }

    #[test]
    fn schema_defines_every_table() {
        for table in [
            "user",
            "password",
            "group",
            "group_admin",
            "group_member",
            "role",
            "role_user",
            "role_group",
            "project",
            "project_group",
        ] {
            let needle = format!("DEFINE TABLE {table} SCHEMAFULL");
            assert!(SCHEMA_V1.contains(&needle), "missing table {table}");
        }
    }
}
