//! Role resource builder.

use demo_core::access::{EntitlementSlug, resolve_role_grants};
use demo_core::error::{DemoError, DemoResult};
use demo_core::models::role::Role;
use demo_core::repository::{GroupRepository, RoleRepository};
use serde_json::Map;
use tracing::info;
use uuid::Uuid;

use crate::builder::{ResourceProvisioner, ResourceSyncer};
use crate::groups::to_grants;
use crate::resource_types::{ResourceKind, ResourceType};
use crate::types::{
    Entitlement, Grant, Page, PageToken, Resource, ResourceId, ResourceTrait,
    parse_entitlement_id,
};

pub fn role_resource(role: &Role, parent: Option<&ResourceId>) -> Resource {
    Resource::new(ResourceKind::Role, role.id, &role.name)
        .with_trait(ResourceTrait::Role {
            profile: Map::new(),
        })
        .with_parent(parent)
}

fn role_entitlement(resource: &Resource, slug: EntitlementSlug) -> Entitlement {
    Entitlement::new(
        resource,
        slug,
        &[ResourceKind::User],
        format!("Is assigned the {} role", resource.display_name),
    )
}

pub struct RoleBuilder<R: RoleRepository, G: GroupRepository> {
    roles: R,
    groups: G,
}

impl<R: RoleRepository, G: GroupRepository> RoleBuilder<R, G> {
    pub fn new(roles: R, groups: G) -> Self {
        Self { roles, groups }
    }

    fn assignment_target(principal: &ResourceId, entitlement: &Entitlement) -> DemoResult<(Uuid, Uuid)> {
        let user_id = principal.expect_kind(ResourceKind::User)?;
        let (resource, slug) = parse_entitlement_id(&entitlement.id)?;
        let role_id = resource.expect_kind(ResourceKind::Role)?;
        if slug != EntitlementSlug::Assignment {
            return Err(DemoError::invalid_reference("assignment", slug.as_str()));
        }
        Ok((role_id, user_id))
    }
}

impl<R: RoleRepository, G: GroupRepository> ResourceSyncer for RoleBuilder<R, G> {
    fn resource_type(&self) -> ResourceType {
        ResourceKind::Role.resource_type()
    }

    async fn list(
        &self,
        parent: Option<&ResourceId>,
        _token: Option<&PageToken>,
    ) -> DemoResult<Page<Resource>> {
        let roles = self.roles.list().await?;
        Ok(Page::last(
            roles.iter().map(|r| role_resource(r, parent)).collect(),
        ))
    }

    async fn entitlements(
        &self,
        resource: &Resource,
        _token: Option<&PageToken>,
    ) -> DemoResult<Page<Entitlement>> {
        Ok(Page::last(vec![role_entitlement(
            resource,
            EntitlementSlug::Assignment,
        )]))
    }

    async fn grants(
        &self,
        resource: &Resource,
        _token: Option<&PageToken>,
    ) -> DemoResult<Page<Grant>> {
        let role = self
            .roles
            .get_by_id(resource.id.expect_kind(ResourceKind::Role)?)
            .await?;
        let derived = resolve_role_grants(&self.groups, &role).await?;
        Ok(Page::last(to_grants(resource, derived, role_entitlement)))
    }
}

impl<R: RoleRepository, G: GroupRepository> ResourceProvisioner for RoleBuilder<R, G> {
    async fn grant(&self, principal: &Resource, entitlement: &Entitlement) -> DemoResult<Vec<Grant>> {
        let (role_id, user_id) = Self::assignment_target(&principal.id, entitlement)?;
        self.roles.grant(user_id, role_id).await?;

        info!(%role_id, %user_id, "Role assignment granted");
        Ok(vec![Grant::new(entitlement, principal.id.clone())])
    }

    /// Only direct assignments can be revoked; a user holding the role
    /// through a group keeps it.
    async fn revoke(&self, grant: &Grant) -> DemoResult<()> {
        let (role_id, user_id) = Self::assignment_target(&grant.principal, &grant.entitlement)?;
        self.roles.revoke(user_id, role_id).await?;

        info!(%role_id, %user_id, "Role assignment revoked");
        Ok(())
    }
}
