//! SurrealDB implementation of [`CredentialRepository`].
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash. An optional pepper (server-side secret) can be
//! provided at construction time. Each user owns at most one row in the
//! `password` table; its record id is the user id.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use demo_core::error::DemoResult;
use demo_core::repository::CredentialRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::ensure_exists;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PasswordRow {
    password_hash: String,
}

fn peppered(password: &str, pepper: Option<&str>) -> Vec<u8> {
    match pepper {
        Some(p) => format!("{p}{password}").into_bytes(),
        None => password.as_bytes().to_vec(),
    }
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing.
pub(crate) fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Hash(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(&peppered(password, pepper), &salt)
        .map_err(|e| DbError::Hash(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// Verify a password against an Argon2id PHC-format hash.
///
/// Returns `Ok(false)` on mismatch and an error only when the stored hash
/// is malformed.
pub fn verify_password(password: &str, hash: &str, pepper: Option<&str>) -> Result<bool, DbError> {
    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| DbError::Hash(format!("invalid hash format: {e}")))?;

    match Argon2::default().verify_password(&peppered(password, pepper), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(DbError::Hash(format!("verify error: {e}"))),
    }
}

/// SurrealDB implementation of the credential repository.
#[derive(Clone)]
pub struct SurrealCredentialRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealCredentialRepository<C> {
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

impl<C: Connection> CredentialRepository for SurrealCredentialRepository<C> {
    async fn change_password(&self, user_id: Uuid, password: &str) -> DemoResult<()> {
        ensure_exists(&self.db, "user", user_id).await?;

        let password_hash = hash_password(password, self.pepper.as_deref())?;
        let user_id_str = user_id.to_string();

        self.db
            .query(
                "UPSERT type::record('password', $user_id) SET \
                 user_id = $user_id, password_hash = $password_hash, \
                 updated_at = time::now()",
            )
            .bind(("user_id", user_id_str))
            .bind(("password_hash", password_hash))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(%user_id, "Password changed");
        Ok(())
    }

    async fn clear_password(&self, user_id: Uuid) -> DemoResult<()> {
        ensure_exists(&self.db, "user", user_id).await?;

        self.db
            .query("DELETE type::record('password', $user_id)")
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(%user_id, "Password cleared");
        Ok(())
    }

    async fn verify_password(&self, user_id: Uuid, password: &str) -> DemoResult<bool> {
        let mut result = self
            .db
            .query("SELECT password_hash FROM type::record('password', $user_id)")
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PasswordRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(verify_password(
                password,
                &row.password_hash,
                self.pepper.as_deref(),
            )?),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_uses_argon2id() {
        let hash = hash_password("hunter2", None).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter2", &hash, None).unwrap());
        assert!(!verify_password("wrong", &hash, None).unwrap());
    }

    #[test]
    fn pepper_is_applied() {
        let hash = hash_password("hunter2", Some("pepper!")).unwrap();
        assert!(verify_password("hunter2", &hash, Some("pepper!")).unwrap());
        assert!(!verify_password("hunter2", &hash, None).unwrap());
    }

    #[test]
    fn malformed_hash_returns_error() {
        assert!(verify_password("pw", "not-a-hash", None).is_err());
    }
}
