//! User resource builder.
//!
//! Users carry the user trait with their email and expose no entitlements.
//! Accounts can be created, deleted and have their password rotated.

use demo_core::error::{DemoError, DemoResult};
use demo_core::models::user::{CreateUser, User};
use demo_core::repository::{CredentialRepository, UserRepository};
use tracing::info;

use crate::builder::{AccountManager, CredentialManager, ResourceManager, ResourceSyncer};
use crate::credential::{password_capability, password_for, password_plaintext};
use crate::resource_types::{ResourceKind, ResourceType};
use crate::types::{
    AccountInfo, CapabilityDetails, CreateAccountResponse, CredentialOptions, Entitlement, Grant,
    Page, PageToken, PlaintextData, Resource, ResourceId, ResourceTrait, UserEmail,
};

pub fn user_resource(user: &User, parent: Option<&ResourceId>) -> Resource {
    Resource::new(ResourceKind::User, user.id, &user.name)
        .with_trait(ResourceTrait::User {
            emails: vec![UserEmail {
                address: user.email.clone(),
                is_primary: true,
            }],
        })
        .with_parent(parent)
}

pub struct UserBuilder<U: UserRepository, K: CredentialRepository> {
    users: U,
    credentials: K,
}

impl<U: UserRepository, K: CredentialRepository> UserBuilder<U, K> {
    pub fn new(users: U, credentials: K) -> Self {
        Self { users, credentials }
    }
}

impl<U: UserRepository, K: CredentialRepository> ResourceSyncer for UserBuilder<U, K> {
    fn resource_type(&self) -> ResourceType {
        ResourceKind::User.resource_type()
    }

    async fn list(
        &self,
        parent: Option<&ResourceId>,
        _token: Option<&PageToken>,
    ) -> DemoResult<Page<Resource>> {
        let users = self.users.list().await?;
        Ok(Page::last(
            users.iter().map(|u| user_resource(u, parent)).collect(),
        ))
    }

    async fn entitlements(
        &self,
        _resource: &Resource,
        _token: Option<&PageToken>,
    ) -> DemoResult<Page<Entitlement>> {
        Ok(Page::empty())
    }

    async fn grants(
        &self,
        _resource: &Resource,
        _token: Option<&PageToken>,
    ) -> DemoResult<Page<Grant>> {
        Ok(Page::empty())
    }
}

impl<U: UserRepository, K: CredentialRepository> AccountManager for UserBuilder<U, K> {
    fn create_account_capability_details(&self) -> CapabilityDetails {
        password_capability()
    }

    async fn create_account(
        &self,
        info: AccountInfo,
        options: CredentialOptions,
    ) -> DemoResult<CreateAccountResponse> {
        let email = info
            .emails
            .into_iter()
            .next()
            .ok_or_else(|| DemoError::Validation {
                message: "account info carries no email".into(),
            })?;

        let password = password_for(options)?;
        if password.is_none() {
            info!(login = %info.login, "Creating account without a password");
        }

        let user = self
            .users
            .create(CreateUser {
                name: info.login,
                email,
                password: password.clone(),
            })
            .await?;

        Ok(CreateAccountResponse {
            resource: user_resource(&user, None),
            plaintext: password.as_deref().map(password_plaintext).into_iter().collect(),
        })
    }
}

impl<U: UserRepository, K: CredentialRepository> CredentialManager for UserBuilder<U, K> {
    fn rotate_capability_details(&self) -> CapabilityDetails {
        password_capability()
    }

    async fn rotate(
        &self,
        id: &ResourceId,
        options: CredentialOptions,
    ) -> DemoResult<Vec<PlaintextData>> {
        let user_id = id.expect_kind(ResourceKind::User)?;
        let user = self.users.get_by_id(user_id).await?;

        match password_for(options)? {
            Some(password) => {
                self.credentials.change_password(user.id, &password).await?;
                Ok(vec![password_plaintext(&password)])
            }
            None => {
                self.credentials.clear_password(user.id).await?;
                Ok(Vec::new())
            }
        }
    }
}

impl<U: UserRepository, K: CredentialRepository> ResourceManager for UserBuilder<U, K> {
    async fn create(&self, _resource: &Resource) -> DemoResult<Resource> {
        Err(DemoError::unsupported("user creation outside account provisioning"))
    }

    async fn delete(&self, id: &ResourceId) -> DemoResult<()> {
        let user_id = id.expect_kind(ResourceKind::User)?;
        self.users.delete(user_id).await
    }
}
