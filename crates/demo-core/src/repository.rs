//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. `list` methods return every row
//! in a single call; the demo model is small and the host does not page.
//! Membership-style mutations are idempotent: granting something already
//! held and revoking something not held both succeed without changes.

use uuid::Uuid;

use crate::error::DemoResult;
use crate::models::{
    group::{CreateGroup, Group},
    project::{CreateProject, Project},
    role::{CreateRole, Role},
    user::{CreateUser, User},
};

pub trait UserRepository: Send + Sync {
    /// Insert the user and, when supplied, its password in one transaction.
    fn create(&self, input: CreateUser) -> impl Future<Output = DemoResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DemoResult<User>> + Send;
    fn list(&self) -> impl Future<Output = DemoResult<Vec<User>>> + Send;
    /// Hard-delete the user row. Memberships, role assignments and project
    /// ownership that reference the user are left in place.
    fn delete(&self, id: Uuid) -> impl Future<Output = DemoResult<()>> + Send;
}

pub trait CredentialRepository: Send + Sync {
    /// Overwrite the user's password. No old-password check is made.
    fn change_password(
        &self,
        user_id: Uuid,
        password: &str,
    ) -> impl Future<Output = DemoResult<()>> + Send;
    /// Remove the user's password, leaving the account without a credential.
    fn clear_password(&self, user_id: Uuid) -> impl Future<Output = DemoResult<()>> + Send;
    /// Returns `false` on mismatch or when the user has no password.
    fn verify_password(
        &self,
        user_id: Uuid,
        password: &str,
    ) -> impl Future<Output = DemoResult<bool>> + Send;
}

pub trait GroupRepository: Send + Sync {
    fn create(&self, input: CreateGroup) -> impl Future<Output = DemoResult<Group>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DemoResult<Group>> + Send;
    fn list(&self) -> impl Future<Output = DemoResult<Vec<Group>>> + Send;

    fn grant_member(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = DemoResult<()>> + Send;
    fn revoke_member(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = DemoResult<()>> + Send;
    fn grant_admin(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = DemoResult<()>> + Send;
    fn revoke_admin(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = DemoResult<()>> + Send;
}

pub trait RoleRepository: Send + Sync {
    fn create(&self, input: CreateRole) -> impl Future<Output = DemoResult<Role>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DemoResult<Role>> + Send;
    fn list(&self) -> impl Future<Output = DemoResult<Vec<Role>>> + Send;

    /// Directly assign the role to a user.
    fn grant(&self, user_id: Uuid, role_id: Uuid) -> impl Future<Output = DemoResult<()>> + Send;
    /// Remove a direct assignment. Group-derived assignments are unaffected.
    fn revoke(&self, user_id: Uuid, role_id: Uuid)
    -> impl Future<Output = DemoResult<()>> + Send;
    fn assign_group(
        &self,
        role_id: Uuid,
        group_id: Uuid,
    ) -> impl Future<Output = DemoResult<()>> + Send;
}

pub trait ProjectRepository: Send + Sync {
    fn create(&self, input: CreateProject) -> impl Future<Output = DemoResult<Project>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DemoResult<Project>> + Send;
    fn list(&self) -> impl Future<Output = DemoResult<Vec<Project>>> + Send;
    fn assign_group(
        &self,
        project_id: Uuid,
        group_id: Uuid,
    ) -> impl Future<Output = DemoResult<()>> + Send;
}
