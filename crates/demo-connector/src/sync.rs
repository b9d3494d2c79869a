//! Minimal sync driver: walks every syncer once and collects the result.

use demo_core::error::DemoResult;
use serde::Serialize;
use tracing::{debug, info};

use crate::builder::ResourceSyncer;
use crate::connector::Demo;
use crate::types::{ConnectorMetadata, Entitlement, Grant, Resource};

/// Everything one sync pass observed.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub metadata: ConnectorMetadata,
    pub resources: Vec<Resource>,
    pub entitlements: Vec<Entitlement>,
    pub grants: Vec<Grant>,
}

impl Snapshot {
    pub fn grants_on<'a>(&'a self, resource: &'a Resource) -> impl Iterator<Item = &'a Grant> {
        self.grants
            .iter()
            .filter(move |g| g.entitlement.resource.id == resource.id)
    }
}

/// List every resource of each syncer, then fetch each resource's
/// entitlements and grants. The first error aborts the pass.
pub async fn sync_all<S: ResourceSyncer>(
    metadata: ConnectorMetadata,
    syncers: &[S],
) -> DemoResult<Snapshot> {
    let mut snapshot = Snapshot {
        metadata,
        resources: Vec::new(),
        entitlements: Vec::new(),
        grants: Vec::new(),
    };

    for syncer in syncers {
        let resource_type = syncer.resource_type();
        let listed = syncer.list(None, None).await?.items;
        debug!(resource_type = %resource_type.id, count = listed.len(), "Listed resources");

        for resource in &listed {
            snapshot
                .entitlements
                .extend(syncer.entitlements(resource, None).await?.items);
            snapshot
                .grants
                .extend(syncer.grants(resource, None).await?.items);
        }
        snapshot.resources.extend(listed);
    }

    info!(
        resources = snapshot.resources.len(),
        entitlements = snapshot.entitlements.len(),
        grants = snapshot.grants.len(),
        "Sync complete"
    );
    Ok(snapshot)
}

impl Demo {
    pub async fn sync(&self) -> DemoResult<Snapshot> {
        sync_all(self.metadata(), &self.resource_syncers()).await
    }
}
