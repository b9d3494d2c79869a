//! Group resource builder.

use demo_core::access::{DerivedGrant, EntitlementSlug, Principal, group_grants};
use demo_core::error::{DemoError, DemoResult};
use demo_core::models::group::Group;
use demo_core::repository::GroupRepository;
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::builder::{ResourceProvisioner, ResourceSyncer};
use crate::resource_types::{ResourceKind, ResourceType};
use crate::types::{
    Entitlement, Grant, Page, PageToken, Resource, ResourceId, ResourceTrait,
    parse_entitlement_id,
};

pub fn group_resource(group: &Group, parent: Option<&ResourceId>) -> Resource {
    let mut profile = Map::new();
    profile.insert("group_color".into(), Value::String("green".into()));

    Resource::new(ResourceKind::Group, group.id, &group.name)
        .with_trait(ResourceTrait::Group { profile })
        .with_parent(parent)
}

fn group_entitlement(resource: &Resource, slug: EntitlementSlug) -> Entitlement {
    let description = match slug {
        EntitlementSlug::Admin => format!("Is an admin of the {} group", resource.display_name),
        _ => format!("Is a member of the {} group", resource.display_name),
    };
    Entitlement::new(resource, slug, &[ResourceKind::User], description)
}

/// Turn resolver output into host grants on `resource`.
pub(crate) fn to_grants(
    resource: &Resource,
    derived: Vec<DerivedGrant>,
    entitlement: impl Fn(&Resource, EntitlementSlug) -> Entitlement,
) -> Vec<Grant> {
    derived
        .into_iter()
        .map(|d| {
            let principal = match d.principal {
                Principal::User(id) => ResourceId::new(ResourceKind::User, id),
                Principal::Group(id) => ResourceId::new(ResourceKind::Group, id),
            };
            Grant::new(&entitlement(resource, d.entitlement), principal)
        })
        .collect()
}

pub struct GroupBuilder<G: GroupRepository> {
    groups: G,
}

impl<G: GroupRepository> GroupBuilder<G> {
    pub fn new(groups: G) -> Self {
        Self { groups }
    }
}

impl<G: GroupRepository> ResourceSyncer for GroupBuilder<G> {
    fn resource_type(&self) -> ResourceType {
        ResourceKind::Group.resource_type()
    }

    async fn list(
        &self,
        parent: Option<&ResourceId>,
        _token: Option<&PageToken>,
    ) -> DemoResult<Page<Resource>> {
        let groups = self.groups.list().await?;
        Ok(Page::last(
            groups.iter().map(|g| group_resource(g, parent)).collect(),
        ))
    }

    async fn entitlements(
        &self,
        resource: &Resource,
        _token: Option<&PageToken>,
    ) -> DemoResult<Page<Entitlement>> {
        Ok(Page::last(vec![
            group_entitlement(resource, EntitlementSlug::Member),
            group_entitlement(resource, EntitlementSlug::Admin),
        ]))
    }

    async fn grants(
        &self,
        resource: &Resource,
        _token: Option<&PageToken>,
    ) -> DemoResult<Page<Grant>> {
        let group = self
            .groups
            .get_by_id(resource.id.expect_kind(ResourceKind::Group)?)
            .await?;
        Ok(Page::last(to_grants(
            resource,
            group_grants(&group),
            group_entitlement,
        )))
    }
}

impl<G: GroupRepository> GroupBuilder<G> {
    /// Resolve `(group, user, slug)` from a principal/entitlement pair.
    fn membership_target(
        principal: &ResourceId,
        entitlement: &Entitlement,
    ) -> DemoResult<(Uuid, Uuid, EntitlementSlug)> {
        let user_id = principal.expect_kind(ResourceKind::User)?;
        let (resource, slug) = parse_entitlement_id(&entitlement.id)?;
        let group_id = resource.expect_kind(ResourceKind::Group)?;
        match slug {
            EntitlementSlug::Member | EntitlementSlug::Admin => Ok((group_id, user_id, slug)),
            other => Err(DemoError::invalid_reference("member or admin", other.as_str())),
        }
    }
}

impl<G: GroupRepository> ResourceProvisioner for GroupBuilder<G> {
    async fn grant(&self, principal: &Resource, entitlement: &Entitlement) -> DemoResult<Vec<Grant>> {
        let (group_id, user_id, slug) = Self::membership_target(&principal.id, entitlement)?;

        if slug == EntitlementSlug::Admin {
            self.groups.grant_admin(group_id, user_id).await?;
        } else {
            self.groups.grant_member(group_id, user_id).await?;
        }

        info!(%group_id, %user_id, %slug, "Group entitlement granted");
        Ok(vec![Grant::new(entitlement, principal.id.clone())])
    }

    async fn revoke(&self, grant: &Grant) -> DemoResult<()> {
        let (group_id, user_id, slug) = Self::membership_target(&grant.principal, &grant.entitlement)?;

        if slug == EntitlementSlug::Admin {
            self.groups.revoke_admin(group_id, user_id).await?;
        } else {
            self.groups.revoke_member(group_id, user_id).await?;
        }

        info!(%group_id, %user_id, %slug, "Group entitlement revoked");
        Ok(())
    }
}
