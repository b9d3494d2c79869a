//! Project resource builder. Projects are read-only through the connector.

use demo_core::access::{EntitlementSlug, resolve_project_grants};
use demo_core::error::{DemoError, DemoResult};
use demo_core::models::project::Project;
use demo_core::repository::{GroupRepository, ProjectRepository};

use crate::builder::{ResourceProvisioner, ResourceSyncer};
use crate::groups::to_grants;
use crate::resource_types::{ResourceKind, ResourceType};
use crate::types::{Entitlement, Grant, Page, PageToken, Resource, ResourceId};

pub fn project_resource(project: &Project, parent: Option<&ResourceId>) -> Resource {
    Resource::new(ResourceKind::Project, project.id, &project.name).with_parent(parent)
}

fn project_entitlement(resource: &Resource, slug: EntitlementSlug) -> Entitlement {
    match slug {
        EntitlementSlug::Owner => Entitlement::new(
            resource,
            slug,
            &[ResourceKind::User],
            format!("Is the owner of the {} project", resource.display_name),
        ),
        _ => Entitlement::new(
            resource,
            slug,
            &[ResourceKind::Group, ResourceKind::User],
            format!("Has access to the {} project", resource.display_name),
        ),
    }
}

pub struct ProjectBuilder<P: ProjectRepository, G: GroupRepository> {
    projects: P,
    groups: G,
}

impl<P: ProjectRepository, G: GroupRepository> ProjectBuilder<P, G> {
    pub fn new(projects: P, groups: G) -> Self {
        Self { projects, groups }
    }
}

impl<P: ProjectRepository, G: GroupRepository> ResourceSyncer for ProjectBuilder<P, G> {
    fn resource_type(&self) -> ResourceType {
        ResourceKind::Project.resource_type()
    }

    async fn list(
        &self,
        parent: Option<&ResourceId>,
        _token: Option<&PageToken>,
    ) -> DemoResult<Page<Resource>> {
        let projects = self.projects.list().await?;
        Ok(Page::last(
            projects
                .iter()
                .map(|p| project_resource(p, parent))
                .collect(),
        ))
    }

    async fn entitlements(
        &self,
        resource: &Resource,
        _token: Option<&PageToken>,
    ) -> DemoResult<Page<Entitlement>> {
        Ok(Page::last(vec![
            project_entitlement(resource, EntitlementSlug::Access),
            project_entitlement(resource, EntitlementSlug::Owner),
        ]))
    }

    async fn grants(
        &self,
        resource: &Resource,
        _token: Option<&PageToken>,
    ) -> DemoResult<Page<Grant>> {
        let project = self
            .projects
            .get_by_id(resource.id.expect_kind(ResourceKind::Project)?)
            .await?;
        let derived = resolve_project_grants(&self.groups, &project).await?;
        Ok(Page::last(to_grants(resource, derived, project_entitlement)))
    }
}

impl<P: ProjectRepository, G: GroupRepository> ResourceProvisioner for ProjectBuilder<P, G> {
    async fn grant(&self, _principal: &Resource, _entitlement: &Entitlement) -> DemoResult<Vec<Grant>> {
        Err(DemoError::unsupported("granting project entitlements"))
    }

    async fn revoke(&self, _grant: &Grant) -> DemoResult<()> {
        Err(DemoError::unsupported("revoking project entitlements"))
    }
}
