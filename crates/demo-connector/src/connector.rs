//! The demo connector: owns the database and hands out resource builders.

use demo_core::error::DemoResult;
use demo_db::repository::{
    SurrealCredentialRepository, SurrealGroupRepository, SurrealProjectRepository,
    SurrealRoleRepository, SurrealUserRepository,
};
use demo_db::{DbManager, run_migrations, seed};
use surrealdb::engine::local::Db;
use tracing::info;

use crate::builder::ResourceSyncer;
use crate::config::ConnectorConfig;
use crate::groups::GroupBuilder;
use crate::projects::ProjectBuilder;
use crate::resource_types::{ResourceKind, ResourceType};
use crate::roles::RoleBuilder;
use crate::types::{
    ConnectorMetadata, CredentialOptions, Entitlement, Grant, Page, PageToken, Resource,
    ResourceId,
};
use crate::users::UserBuilder;

pub type DemoUserBuilder = UserBuilder<SurrealUserRepository<Db>, SurrealCredentialRepository<Db>>;
pub type DemoGroupBuilder = GroupBuilder<SurrealGroupRepository<Db>>;
pub type DemoRoleBuilder = RoleBuilder<SurrealRoleRepository<Db>, SurrealGroupRepository<Db>>;
pub type DemoProjectBuilder =
    ProjectBuilder<SurrealProjectRepository<Db>, SurrealGroupRepository<Db>>;

/// One syncer per resource type.
pub enum DemoSyncer {
    User(DemoUserBuilder),
    Group(DemoGroupBuilder),
    Role(DemoRoleBuilder),
    Project(DemoProjectBuilder),
}

impl ResourceSyncer for DemoSyncer {
    fn resource_type(&self) -> ResourceType {
        match self {
            Self::User(b) => b.resource_type(),
            Self::Group(b) => b.resource_type(),
            Self::Role(b) => b.resource_type(),
            Self::Project(b) => b.resource_type(),
        }
    }

    async fn list(
        &self,
        parent: Option<&ResourceId>,
        token: Option<&PageToken>,
    ) -> DemoResult<Page<Resource>> {
        match self {
            Self::User(b) => b.list(parent, token).await,
            Self::Group(b) => b.list(parent, token).await,
            Self::Role(b) => b.list(parent, token).await,
            Self::Project(b) => b.list(parent, token).await,
        }
    }

    async fn entitlements(
        &self,
        resource: &Resource,
        token: Option<&PageToken>,
    ) -> DemoResult<Page<Entitlement>> {
        match self {
            Self::User(b) => b.entitlements(resource, token).await,
            Self::Group(b) => b.entitlements(resource, token).await,
            Self::Role(b) => b.entitlements(resource, token).await,
            Self::Project(b) => b.entitlements(resource, token).await,
        }
    }

    async fn grants(
        &self,
        resource: &Resource,
        token: Option<&PageToken>,
    ) -> DemoResult<Page<Grant>> {
        match self {
            Self::User(b) => b.grants(resource, token).await,
            Self::Group(b) => b.grants(resource, token).await,
            Self::Role(b) => b.grants(resource, token).await,
            Self::Project(b) => b.grants(resource, token).await,
        }
    }
}

pub struct Demo {
    db: DbManager,
    config: ConnectorConfig,
}

impl Demo {
    /// Open the database, apply migrations and, when `init_db` is set,
    /// populate the demo dataset.
    pub async fn new(config: ConnectorConfig) -> DemoResult<Self> {
        let db = DbManager::connect(&config.db).await?;
        run_migrations(db.client()).await?;

        if config.init_db {
            let inserted = seed::seed(db.client(), config.pepper.as_deref()).await?;
            info!(inserted, "Database initialisation requested");
        }

        Ok(Self { db, config })
    }

    fn users_repo(&self) -> SurrealUserRepository<Db> {
        let client = self.db.client().clone();
        match &self.config.pepper {
            Some(p) => SurrealUserRepository::with_pepper(client, p.clone()),
            None => SurrealUserRepository::new(client),
        }
    }

    fn credentials_repo(&self) -> SurrealCredentialRepository<Db> {
        let client = self.db.client().clone();
        match &self.config.pepper {
            Some(p) => SurrealCredentialRepository::with_pepper(client, p.clone()),
            None => SurrealCredentialRepository::new(client),
        }
    }

    fn groups_repo(&self) -> SurrealGroupRepository<Db> {
        SurrealGroupRepository::new(self.db.client().clone())
    }

    pub fn users(&self) -> DemoUserBuilder {
        UserBuilder::new(self.users_repo(), self.credentials_repo())
    }

    pub fn groups(&self) -> DemoGroupBuilder {
        GroupBuilder::new(self.groups_repo())
    }

    pub fn roles(&self) -> DemoRoleBuilder {
        RoleBuilder::new(
            SurrealRoleRepository::new(self.db.client().clone()),
            self.groups_repo(),
        )
    }

    pub fn projects(&self) -> DemoProjectBuilder {
        ProjectBuilder::new(
            SurrealProjectRepository::new(self.db.client().clone()),
            self.groups_repo(),
        )
    }

    pub fn resource_syncers(&self) -> Vec<DemoSyncer> {
        vec![
            DemoSyncer::User(self.users()),
            DemoSyncer::Group(self.groups()),
            DemoSyncer::Role(self.roles()),
            DemoSyncer::Project(self.projects()),
        ]
    }

    pub fn metadata(&self) -> ConnectorMetadata {
        ConnectorMetadata {
            display_name: "Demo".into(),
            description: "A demo connector".into(),
            resource_types: ResourceKind::ALL.iter().map(|k| k.resource_type()).collect(),
        }
    }

    /// Check that the database answers.
    pub async fn validate(&self) -> DemoResult<()> {
        self.db.ping().await?;
        Ok(())
    }

    /// Random-password options using the configured default length.
    pub fn random_password(&self) -> CredentialOptions {
        CredentialOptions::RandomPassword {
            length: self.config.default_password_length,
        }
    }
}
