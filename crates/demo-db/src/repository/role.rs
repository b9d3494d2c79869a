//! SurrealDB implementation of [`RoleRepository`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use demo_core::error::DemoResult;
use demo_core::models::role::{CreateRole, Role};
use demo_core::repository::RoleRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::{create_error, ensure_exists, ensure_name_free, pair_key, parse_id};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct RoleRow {
    name: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct RoleRowWithId {
    record_id: String,
    name: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct RoleUserRow {
    role_id: String,
    user_id: String,
    #[allow(dead_code)]
    granted_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct RoleGroupRow {
    role_id: String,
    group_id: String,
    #[allow(dead_code)]
    granted_at: DateTime<Utc>,
}

/// SurrealDB implementation of the Role repository.
#[derive(Clone)]
pub struct SurrealRoleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRoleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RoleRepository for SurrealRoleRepository<C> {
    async fn create(&self, input: CreateRole) -> DemoResult<Role> {
        ensure_name_free(&self.db, "role", &input.name).await?;
        let name = input.name.clone();

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query("CREATE type::record('role', $id) SET name = $name")
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .await
            .map_err(|e| create_error("role", &name, e))?;

        let mut result = result
            .check()
            .map_err(|e| create_error("role", &name, e))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("role", id_str))?;

        info!(role_id = %id, "Role created");
        Ok(Role {
            id,
            name: row.name,
            direct_assignments: Vec::new(),
            group_assignments: Vec::new(),
            created_at: row.created_at,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DemoResult<Role> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('role', $id); \
                 SELECT role_id, user_id, granted_at FROM role_user \
                 WHERE role_id = $id ORDER BY granted_at ASC; \
                 SELECT role_id, group_id, granted_at FROM role_group \
                 WHERE role_id = $id ORDER BY granted_at ASC;",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("role", id_str))?;
        let users: Vec<RoleUserRow> = result.take(1).map_err(DbError::from)?;
        let groups: Vec<RoleGroupRow> = result.take(2).map_err(DbError::from)?;

        Ok(Role {
            id,
            name: row.name,
            direct_assignments: users
                .iter()
                .map(|r| parse_id(&r.user_id, "user"))
                .collect::<Result<_, _>>()?,
            group_assignments: groups
                .iter()
                .map(|r| parse_id(&r.group_id, "group"))
                .collect::<Result<_, _>>()?,
            created_at: row.created_at,
        })
    }

    async fn list(&self) -> DemoResult<Vec<Role>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM role \
                 ORDER BY created_at ASC; \
                 SELECT role_id, user_id, granted_at FROM role_user \
                 ORDER BY granted_at ASC; \
                 SELECT role_id, group_id, granted_at FROM role_group \
                 ORDER BY granted_at ASC;",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;
        let user_rows: Vec<RoleUserRow> = result.take(1).map_err(DbError::from)?;
        let group_rows: Vec<RoleGroupRow> = result.take(2).map_err(DbError::from)?;

        let mut users: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for r in user_rows {
            users
                .entry(parse_id(&r.role_id, "role")?)
                .or_default()
                .push(parse_id(&r.user_id, "user")?);
        }
        let mut groups: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for r in group_rows {
            groups
                .entry(parse_id(&r.role_id, "role")?)
                .or_default()
                .push(parse_id(&r.group_id, "group")?);
        }

        let roles = rows
            .into_iter()
            .map(|row| {
                let id = parse_id(&row.record_id, "role")?;
                Ok(Role {
                    id,
                    name: row.name,
                    direct_assignments: users.remove(&id).unwrap_or_default(),
                    group_assignments: groups.remove(&id).unwrap_or_default(),
                    created_at: row.created_at,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(roles)
    }

    async fn grant(&self, user_id: Uuid, role_id: Uuid) -> DemoResult<()> {
        ensure_exists(&self.db, "user", user_id).await?;
        ensure_exists(&self.db, "role", role_id).await?;

        self.db
            .query(
                "UPSERT type::record('role_user', $key) SET \
                 role_id = $role_id, user_id = $user_id",
            )
            .bind(("key", pair_key(role_id, user_id)))
            .bind(("role_id", role_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(%role_id, %user_id, "Role granted");
        Ok(())
    }

    async fn revoke(&self, user_id: Uuid, role_id: Uuid) -> DemoResult<()> {
        ensure_exists(&self.db, "user", user_id).await?;
        ensure_exists(&self.db, "role", role_id).await?;

        self.db
            .query("DELETE type::record('role_user', $key)")
            .bind(("key", pair_key(role_id, user_id)))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(%role_id, %user_id, "Role revoked");
        Ok(())
    }

    async fn assign_group(&self, role_id: Uuid, group_id: Uuid) -> DemoResult<()> {
        ensure_exists(&self.db, "role", role_id).await?;
        ensure_exists(&self.db, "group", group_id).await?;

        self.db
            .query(
                "UPSERT type::record('role_group', $key) SET \
                 role_id = $role_id, group_id = $group_id",
            )
            .bind(("key", pair_key(role_id, group_id)))
            .bind(("role_id", role_id.to_string()))
            .bind(("group_id", group_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(%role_id, %group_id, "Group assigned to role");
        Ok(())
    }
}
