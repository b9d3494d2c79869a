//! Shapes exchanged with the hosting sync engine.
//!
//! Identifiers are flat strings:
//!
//! ```text
//! resource     user:<uuid>
//! entitlement  group:<uuid>:member
//! grant        group:<uuid>:member:user:<uuid>
//! ```

use std::fmt;
use std::str::FromStr;

use demo_core::access::{EntitlementPurpose, EntitlementSlug};
use demo_core::error::{DemoError, DemoResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::resource_types::{ResourceKind, ResourceType};

/// Reference to a single resource of a known type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    pub resource_type: ResourceKind,
    pub resource: String,
}

impl ResourceId {
    pub fn new(resource_type: ResourceKind, id: Uuid) -> Self {
        Self {
            resource_type,
            resource: id.to_string(),
        }
    }

    /// The stored identifier behind this reference.
    pub fn uuid(&self) -> DemoResult<Uuid> {
        Uuid::parse_str(&self.resource).map_err(|e| DemoError::Validation {
            message: format!("invalid {} id {:?}: {e}", self.resource_type, self.resource),
        })
    }

    /// Fail with `InvalidReference` unless this points at a `kind` resource.
    pub fn expect_kind(&self, kind: ResourceKind) -> DemoResult<Uuid> {
        if self.resource_type != kind {
            return Err(DemoError::invalid_reference(
                kind.as_str(),
                self.resource_type.as_str(),
            ));
        }
        self.uuid()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.resource)
    }
}

impl FromStr for ResourceId {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, resource) = s.split_once(':').ok_or_else(|| DemoError::Validation {
            message: format!("invalid resource id {s:?}"),
        })?;
        if resource.is_empty() || resource.contains(':') {
            return Err(DemoError::Validation {
                message: format!("invalid resource id {s:?}"),
            });
        }
        Ok(Self {
            resource_type: kind.parse()?,
            resource: resource.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEmail {
    pub address: String,
    pub is_primary: bool,
}

/// Well-known shape data attached to a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "trait", rename_all = "snake_case")]
pub enum ResourceTrait {
    User { emails: Vec<UserEmail> },
    Group { profile: Map<String, Value> },
    Role { profile: Map<String, Value> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_resource_id: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traits: Vec<ResourceTrait>,
}

impl Resource {
    pub fn new(kind: ResourceKind, id: Uuid, display_name: impl Into<String>) -> Self {
        Self {
            id: ResourceId::new(kind, id),
            display_name: display_name.into(),
            parent_resource_id: None,
            traits: Vec::new(),
        }
    }

    pub fn with_trait(mut self, t: ResourceTrait) -> Self {
        self.traits.push(t);
        self
    }

    pub fn with_parent(mut self, parent: Option<&ResourceId>) -> Self {
        self.parent_resource_id = parent.cloned();
        self
    }
}

/// Something a principal can hold on a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entitlement {
    pub id: String,
    pub resource: Resource,
    pub slug: EntitlementSlug,
    pub display_name: String,
    pub description: String,
    pub purpose: EntitlementPurpose,
    pub grantable_to: Vec<ResourceKind>,
}

impl Entitlement {
    pub fn new(
        resource: &Resource,
        slug: EntitlementSlug,
        grantable_to: &[ResourceKind],
        description: String,
    ) -> Self {
        Self {
            id: entitlement_id(&resource.id, slug),
            display_name: format!("{} {}", resource.display_name, slug),
            resource: resource.clone(),
            slug,
            description,
            purpose: slug.purpose(),
            grantable_to: grantable_to.to_vec(),
        }
    }
}

pub fn entitlement_id(resource: &ResourceId, slug: EntitlementSlug) -> String {
    format!("{resource}:{slug}")
}

/// Split `type:id:slug` into its resource reference and slug.
pub fn parse_entitlement_id(id: &str) -> DemoResult<(ResourceId, EntitlementSlug)> {
    let (resource, slug) = id.rsplit_once(':').ok_or_else(|| DemoError::Validation {
        message: format!("invalid entitlement id {id:?}"),
    })?;
    Ok((resource.parse()?, slug.parse()?))
}

/// A principal holding an entitlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    pub id: String,
    pub entitlement: Entitlement,
    pub principal: ResourceId,
}

impl Grant {
    pub fn new(entitlement: &Entitlement, principal: ResourceId) -> Self {
        Self {
            id: format!(
                "{}:{}:{}",
                entitlement.id, principal.resource_type, principal.resource
            ),
            entitlement: entitlement.clone(),
            principal,
        }
    }
}

/// Opaque continuation cursor. Every page produced here is the last one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageToken(pub String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<PageToken>,
}

impl<T> Page<T> {
    /// A final page holding `items`.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }

    pub fn empty() -> Self {
        Self::last(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorMetadata {
    pub display_name: String,
    pub description: String,
    pub resource_types: Vec<ResourceType>,
}

/// Credential kinds a capability can advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialOption {
    RandomPassword,
    NoPassword,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDetails {
    pub supported: Vec<CredentialOption>,
    pub preferred: CredentialOption,
}

/// What the caller asked for when provisioning or rotating a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialOptions {
    RandomPassword { length: usize },
    NoPassword,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub login: String,
    pub emails: Vec<String>,
}

/// Secret material returned to the caller once and never stored.
#[derive(Clone, PartialEq, Eq)]
pub struct PlaintextData {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for PlaintextData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaintextData")
            .field("name", &self.name)
            .field("bytes", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateAccountResponse {
    pub resource: Resource,
    pub plaintext: Vec<PlaintextData>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_id_round_trips_through_display() {
        let id = ResourceId::new(ResourceKind::Group, Uuid::from_u128(7));
        let encoded = id.to_string();
        assert!(encoded.starts_with("group:"));
        assert_eq!(encoded.parse::<ResourceId>().unwrap(), id);
    }

    #[test]
    fn resource_id_rejects_unknown_type_and_extra_parts() {
        assert!("widget:1".parse::<ResourceId>().is_err());
        assert!("user".parse::<ResourceId>().is_err());
        assert!("user:a:b".parse::<ResourceId>().is_err());
    }

    #[test]
    fn entitlement_and_grant_ids() {
        let group = Resource::new(ResourceKind::Group, Uuid::from_u128(1), "Engineers");
        let ent = Entitlement::new(
            &group,
            EntitlementSlug::Admin,
            &[ResourceKind::User],
            String::new(),
        );
        assert_eq!(ent.id, format!("group:{}:admin", Uuid::from_u128(1)));
        assert_eq!(ent.purpose, EntitlementPurpose::Permission);

        let (resource, slug) = parse_entitlement_id(&ent.id).unwrap();
        assert_eq!(resource, group.id);
        assert_eq!(slug, EntitlementSlug::Admin);

        let principal = ResourceId::new(ResourceKind::User, Uuid::from_u128(2));
        let grant = Grant::new(&ent, principal);
        assert_eq!(
            grant.id,
            format!("{}:user:{}", ent.id, Uuid::from_u128(2))
        );
    }

    #[test]
    fn expect_kind_reports_the_mismatch() {
        let id = ResourceId::new(ResourceKind::Group, Uuid::from_u128(1));
        match id.expect_kind(ResourceKind::User).unwrap_err() {
            DemoError::InvalidReference { expected, actual } => {
                assert_eq!(expected, "user");
                assert_eq!(actual, "group");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn plaintext_is_redacted_in_debug_output() {
        let data = PlaintextData {
            name: "password".into(),
            bytes: b"s3cret".to_vec(),
        };
        assert!(!format!("{data:?}").contains("s3cret"));
    }
}
