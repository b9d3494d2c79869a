//! SurrealDB implementation of [`UserRepository`].

use chrono::{DateTime, Utc};
use demo_core::error::DemoResult;
use demo_core::models::user::{CreateUser, User};
use demo_core::repository::UserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::{create_error, ensure_exists, ensure_name_free, hash_password, parse_id};
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    name: String,
    email: String,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, id: Uuid) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        Ok(User {
            id: parse_id(&self.record_id, "user")?,
            name: self.name,
            email: self.email,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> DemoResult<User> {
        ensure_name_free(&self.db, "user", &input.name).await?;
        let name = input.name.clone();

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        // User row and password row are written together or not at all.
        let result = match input.password {
            Some(ref password) => {
                let password_hash = hash_password(password, self.pepper.as_deref())?;
                self.db
                    .query(
                        "BEGIN TRANSACTION; \
                         CREATE type::record('user', $id) SET \
                         name = $name, email = $email; \
                         CREATE type::record('password', $id) SET \
                         user_id = $id, password_hash = $password_hash; \
                         COMMIT TRANSACTION;",
                    )
                    .bind(("id", id_str.clone()))
                    .bind(("name", input.name))
                    .bind(("email", input.email))
                    .bind(("password_hash", password_hash))
                    .await
            }
            None => {
                self.db
                    .query(
                        "CREATE type::record('user', $id) SET \
                         name = $name, email = $email",
                    )
                    .bind(("id", id_str.clone()))
                    .bind(("name", input.name))
                    .bind(("email", input.email))
                    .await
            }
        };

        result
            .map_err(|e| create_error("user", &name, e))?
            .check()
            .map_err(|e| create_error("user", &name, e))?;

        info!(user_id = %id, "User created");
        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> DemoResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", id_str))?;

        Ok(row.into_user(id))
    }

    async fn list(&self) -> DemoResult<Vec<User>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM user ORDER BY created_at ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;

        let users = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(users)
    }

    async fn delete(&self, id: Uuid) -> DemoResult<()> {
        ensure_exists(&self.db, "user", id).await?;

        // Memberships, role assignments and project ownership keep their
        // references; only the account and its credential go away.
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE type::record('password', $id); \
                 DELETE type::record('user', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(user_id = %id, "User deleted");
        Ok(())
    }
}
