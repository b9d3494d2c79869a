//! Callback surfaces the host drives.
//!
//! Every resource type implements [`ResourceSyncer`]. The other traits are
//! optional capabilities: only builders whose resource type supports a
//! mutation implement the matching trait.

use demo_core::error::DemoResult;

use crate::resource_types::ResourceType;
use crate::types::{
    AccountInfo, CapabilityDetails, CreateAccountResponse, CredentialOptions, Entitlement, Grant,
    Page, PageToken, PlaintextData, Resource, ResourceId,
};

pub trait ResourceSyncer: Send + Sync {
    fn resource_type(&self) -> ResourceType;

    /// Every resource of this type. `parent` is echoed onto the results and
    /// otherwise ignored; the token is ignored.
    fn list(
        &self,
        parent: Option<&ResourceId>,
        token: Option<&PageToken>,
    ) -> impl Future<Output = DemoResult<Page<Resource>>> + Send;

    fn entitlements(
        &self,
        resource: &Resource,
        token: Option<&PageToken>,
    ) -> impl Future<Output = DemoResult<Page<Entitlement>>> + Send;

    fn grants(
        &self,
        resource: &Resource,
        token: Option<&PageToken>,
    ) -> impl Future<Output = DemoResult<Page<Grant>>> + Send;
}

pub trait ResourceProvisioner: Send + Sync {
    fn grant(
        &self,
        principal: &Resource,
        entitlement: &Entitlement,
    ) -> impl Future<Output = DemoResult<Vec<Grant>>> + Send;

    fn revoke(&self, grant: &Grant) -> impl Future<Output = DemoResult<()>> + Send;
}

pub trait AccountManager: Send + Sync {
    fn create_account_capability_details(&self) -> CapabilityDetails;

    fn create_account(
        &self,
        info: AccountInfo,
        options: CredentialOptions,
    ) -> impl Future<Output = DemoResult<CreateAccountResponse>> + Send;
}

pub trait CredentialManager: Send + Sync {
    fn rotate_capability_details(&self) -> CapabilityDetails;

    fn rotate(
        &self,
        id: &ResourceId,
        options: CredentialOptions,
    ) -> impl Future<Output = DemoResult<Vec<PlaintextData>>> + Send;
}

pub trait ResourceManager: Send + Sync {
    fn create(&self, resource: &Resource) -> impl Future<Output = DemoResult<Resource>> + Send;

    fn delete(&self, id: &ResourceId) -> impl Future<Output = DemoResult<()>> + Send;
}
