//! SurrealDB implementation of [`ProjectRepository`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use demo_core::error::DemoResult;
use demo_core::models::project::{CreateProject, Project};
use demo_core::repository::ProjectRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::{create_error, ensure_exists, ensure_name_free, pair_key, parse_id};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ProjectRow {
    name: String,
    owner: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ProjectRowWithId {
    record_id: String,
    name: String,
    owner: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ProjectGroupRow {
    project_id: String,
    group_id: String,
    #[allow(dead_code)]
    granted_at: DateTime<Utc>,
}

/// SurrealDB implementation of the Project repository.
#[derive(Clone)]
pub struct SurrealProjectRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProjectRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProjectRepository for SurrealProjectRepository<C> {
    async fn create(&self, input: CreateProject) -> DemoResult<Project> {
        ensure_name_free(&self.db, "project", &input.name).await?;
        let name = input.name.clone();
        ensure_exists(&self.db, "user", input.owner).await?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query("CREATE type::record('project', $id) SET name = $name, owner = $owner")
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("owner", input.owner.to_string()))
            .await
            .map_err(|e| create_error("project", &name, e))?;

        let mut result = result
            .check()
            .map_err(|e| create_error("project", &name, e))?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("project", id_str))?;

        info!(project_id = %id, owner = %input.owner, "Project created");
        Ok(Project {
            id,
            name: row.name,
            owner: parse_id(&row.owner, "owner")?,
            group_assignments: Vec::new(),
            created_at: row.created_at,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DemoResult<Project> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('project', $id); \
                 SELECT project_id, group_id, granted_at FROM project_group \
                 WHERE project_id = $id ORDER BY granted_at ASC;",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("project", id_str))?;
        let groups: Vec<ProjectGroupRow> = result.take(1).map_err(DbError::from)?;

        Ok(Project {
            id,
            name: row.name,
            owner: parse_id(&row.owner, "owner")?,
            group_assignments: groups
                .iter()
                .map(|r| parse_id(&r.group_id, "group"))
                .collect::<Result<_, _>>()?,
            created_at: row.created_at,
        })
    }

    async fn list(&self) -> DemoResult<Vec<Project>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM project \
                 ORDER BY created_at ASC; \
                 SELECT project_id, group_id, granted_at FROM project_group \
                 ORDER BY granted_at ASC;",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProjectRowWithId> = result.take(0).map_err(DbError::from)?;
        let group_rows: Vec<ProjectGroupRow> = result.take(1).map_err(DbError::from)?;

        let mut groups: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for r in group_rows {
            groups
                .entry(parse_id(&r.project_id, "project")?)
                .or_default()
                .push(parse_id(&r.group_id, "group")?);
        }

        let projects = rows
            .into_iter()
            .map(|row| {
                let id = parse_id(&row.record_id, "project")?;
                Ok(Project {
                    id,
                    name: row.name,
                    owner: parse_id(&row.owner, "owner")?,
                    group_assignments: groups.remove(&id).unwrap_or_default(),
                    created_at: row.created_at,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(projects)
    }

    async fn assign_group(&self, project_id: Uuid, group_id: Uuid) -> DemoResult<()> {
        ensure_exists(&self.db, "project", project_id).await?;
        ensure_exists(&self.db, "group", group_id).await?;

        self.db
            .query(
                "UPSERT type::record('project_group', $key) SET \
                 project_id = $project_id, group_id = $group_id",
            )
            .bind(("key", pair_key(project_id, group_id)))
            .bind(("project_id", project_id.to_string()))
            .bind(("group_id", group_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(%project_id, %group_id, "Group assigned to project");
        Ok(())
    }
}
