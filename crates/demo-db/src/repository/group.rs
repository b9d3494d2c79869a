//! SurrealDB implementation of [`GroupRepository`].
//!
//! Admins and members live in the `group_admin` and `group_member` child
//! tables. Granting upserts the row keyed by `(group, user)`; revoking
//! deletes it. Both are therefore idempotent single statements.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use demo_core::error::DemoResult;
use demo_core::models::group::{CreateGroup, Group};
use demo_core::repository::GroupRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::{create_error, ensure_exists, ensure_name_free, pair_key, parse_id};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct GroupRow {
    name: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct GroupRowWithId {
    record_id: String,
    name: String,
    created_at: DateTime<Utc>,
}

/// One row of `group_admin` or `group_member`.
#[derive(Debug, SurrealValue)]
struct MembershipRow {
    group_id: String,
    user_id: String,
    #[allow(dead_code)]
    granted_at: DateTime<Utc>,
}

#[derive(Clone, Copy)]
enum Membership {
    Admin,
    Member,
}

impl Membership {
    fn table(self) -> &'static str {
        match self {
            Self::Admin => "group_admin",
            Self::Member => "group_member",
        }
    }
}

fn user_ids(rows: Vec<MembershipRow>) -> Result<Vec<Uuid>, DbError> {
    rows.iter().map(|r| parse_id(&r.user_id, "user")).collect()
}

/// Bucket membership rows by group id, keeping row order.
fn by_group(rows: Vec<MembershipRow>) -> Result<HashMap<Uuid, Vec<Uuid>>, DbError> {
    let mut map: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for row in rows {
        map.entry(parse_id(&row.group_id, "group")?)
            .or_default()
            .push(parse_id(&row.user_id, "user")?);
    }
    Ok(map)
}

/// SurrealDB implementation of the Group repository.
#[derive(Clone)]
pub struct SurrealGroupRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealGroupRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn grant(&self, kind: Membership, group_id: Uuid, user_id: Uuid) -> DemoResult<()> {
        ensure_exists(&self.db, "group", group_id).await?;
        ensure_exists(&self.db, "user", user_id).await?;

        let query = format!(
            "UPSERT type::record('{}', $key) SET \
             group_id = $group_id, user_id = $user_id",
            kind.table()
        );
        self.db
            .query(query)
            .bind(("key", pair_key(group_id, user_id)))
            .bind(("group_id", group_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(%group_id, %user_id, table = kind.table(), "Group membership granted");
        Ok(())
    }

    async fn revoke(&self, kind: Membership, group_id: Uuid, user_id: Uuid) -> DemoResult<()> {
        ensure_exists(&self.db, "group", group_id).await?;
        ensure_exists(&self.db, "user", user_id).await?;

        let query = format!("DELETE type::record('{}', $key)", kind.table());
        self.db
            .query(query)
            .bind(("key", pair_key(group_id, user_id)))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(%group_id, %user_id, table = kind.table(), "Group membership revoked");
        Ok(())
    }
}

impl<C: Connection> GroupRepository for SurrealGroupRepository<C> {
    async fn create(&self, input: CreateGroup) -> DemoResult<Group> {
        ensure_name_free(&self.db, "group", &input.name).await?;
        let name = input.name.clone();

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query("CREATE type::record('group', $id) SET name = $name")
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .await
            .map_err(|e| create_error("group", &name, e))?;

        let mut result = result
            .check()
            .map_err(|e| create_error("group", &name, e))?;

        let rows: Vec<GroupRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("group", id_str))?;

        info!(group_id = %id, "Group created");
        Ok(Group {
            id,
            name: row.name,
            admins: Vec::new(),
            members: Vec::new(),
            created_at: row.created_at,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DemoResult<Group> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('group', $id); \
                 SELECT group_id, user_id, granted_at FROM group_admin \
                 WHERE group_id = $id ORDER BY granted_at ASC; \
                 SELECT group_id, user_id, granted_at FROM group_member \
                 WHERE group_id = $id ORDER BY granted_at ASC;",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GroupRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("group", id_str))?;
        let admins: Vec<MembershipRow> = result.take(1).map_err(DbError::from)?;
        let members: Vec<MembershipRow> = result.take(2).map_err(DbError::from)?;

        Ok(Group {
            id,
            name: row.name,
            admins: user_ids(admins)?,
            members: user_ids(members)?,
            created_at: row.created_at,
        })
    }

    async fn list(&self) -> DemoResult<Vec<Group>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM group \
                 ORDER BY created_at ASC; \
                 SELECT group_id, user_id, granted_at FROM group_admin \
                 ORDER BY granted_at ASC; \
                 SELECT group_id, user_id, granted_at FROM group_member \
                 ORDER BY granted_at ASC;",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GroupRowWithId> = result.take(0).map_err(DbError::from)?;
        let admin_rows: Vec<MembershipRow> = result.take(1).map_err(DbError::from)?;
        let member_rows: Vec<MembershipRow> = result.take(2).map_err(DbError::from)?;

        let mut admins = by_group(admin_rows)?;
        let mut members = by_group(member_rows)?;

        let groups = rows
            .into_iter()
            .map(|row| {
                let id = parse_id(&row.record_id, "group")?;
                Ok(Group {
                    id,
                    name: row.name,
                    admins: admins.remove(&id).unwrap_or_default(),
                    members: members.remove(&id).unwrap_or_default(),
                    created_at: row.created_at,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(groups)
    }

    async fn grant_member(&self, group_id: Uuid, user_id: Uuid) -> DemoResult<()> {
        self.grant(Membership::Member, group_id, user_id).await
    }

    async fn revoke_member(&self, group_id: Uuid, user_id: Uuid) -> DemoResult<()> {
        self.revoke(Membership::Member, group_id, user_id).await
    }

    async fn grant_admin(&self, group_id: Uuid, user_id: Uuid) -> DemoResult<()> {
        self.grant(Membership::Admin, group_id, user_id).await
    }

    async fn revoke_admin(&self, group_id: Uuid, user_id: Uuid) -> DemoResult<()> {
        self.revoke(Membership::Admin, group_id, user_id).await
    }
}
