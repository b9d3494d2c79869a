//! SurrealDB repository implementations.

mod credential;
mod group;
mod project;
mod role;
mod user;

pub use credential::{SurrealCredentialRepository, verify_password};
pub use group::SurrealGroupRepository;
pub use project::SurrealProjectRepository;
pub use role::SurrealRoleRepository;
pub use user::SurrealUserRepository;

pub(crate) use credential::hash_password;

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}

pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::InvalidData(format!("invalid {what} UUID: {e}")))
}

/// Record key of a child-table row linking `parent` to `child`.
pub(crate) fn pair_key(parent: Uuid, child: Uuid) -> String {
    format!("{parent}_{child}")
}

/// Fail with `NotFound` unless `table:id` exists.
pub(crate) async fn ensure_exists<C: Connection>(
    db: &Surreal<C>,
    table: &'static str,
    id: Uuid,
) -> Result<(), DbError> {
    let mut result = db
        .query("SELECT count() AS total FROM type::record($table, $id) GROUP ALL")
        .bind(("table", table))
        .bind(("id", id.to_string()))
        .await?;
    let rows: Vec<CountRow> = result.take(0)?;
    if rows.first().map(|r| r.total).unwrap_or(0) == 0 {
        return Err(DbError::not_found(table, id));
    }
    Ok(())
}

fn name_taken(table: &str, name: &str) -> DbError {
    DbError::AlreadyExists {
        entity: format!("{table} named {name}"),
    }
}

/// Classify a failed `CREATE` on `table`. Another writer that claimed
/// `name` first surfaces either as a UNIQUE violation on the name index
/// or as a write conflict; both become `AlreadyExists`.
pub(crate) fn create_error(table: &str, name: &str, err: impl std::fmt::Display) -> DbError {
    let msg = err.to_string();
    let index = format!("idx_{table}_name");
    if msg.contains(&index) || msg.to_lowercase().contains("conflict") {
        name_taken(table, name)
    } else {
        DbError::Query(msg)
    }
}

/// Fail with `AlreadyExists` if a row in `table` already uses `name`.
/// The name index stays the authority; see [`create_error`].
pub(crate) async fn ensure_name_free<C: Connection>(
    db: &Surreal<C>,
    table: &'static str,
    name: &str,
) -> Result<(), DbError> {
    let query = format!("SELECT count() AS total FROM {table} WHERE name = $name GROUP ALL");
    let mut result = db.query(query).bind(("name", name.to_string())).await?;
    let rows: Vec<CountRow> = result.take(0)?;
    if rows.first().map(|r| r.total).unwrap_or(0) > 0 {
        return Err(name_taken(table, name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_key_is_stable_and_ordered() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        assert_eq!(pair_key(a, b), pair_key(a, b));
        assert_ne!(pair_key(a, b), pair_key(b, a));
    }

    #[test]
    fn create_error_maps_name_races_to_already_exists() {
        let unique = create_error(
            "group",
            "Ops",
            "Database index `idx_group_name` already contains 'Ops'",
        );
        assert!(matches!(unique, DbError::AlreadyExists { .. }));

        let conflict = create_error(
            "user",
            "ann",
            "Transaction conflict: Write conflict, retry the transaction",
        );
        assert!(matches!(conflict, DbError::AlreadyExists { .. }));

        let other = create_error("role", "Admin", "Found 'x' for field `name`");
        assert!(matches!(other, DbError::Query(_)));
    }

    #[test]
    fn parse_id_rejects_garbage() {
        assert!(parse_id("not-a-uuid", "user").is_err());
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "user").unwrap(), id);
    }
}
