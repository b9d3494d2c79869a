//! The closed set of resource types this connector exposes.

use std::fmt;
use std::str::FromStr;

use demo_core::error::DemoError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    User,
    Group,
    Role,
    Project,
}

/// Well-known shapes a resource type can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTrait {
    User,
    Group,
    Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceType {
    pub id: ResourceKind,
    pub display_name: String,
    pub traits: Vec<TypeTrait>,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [Self::User, Self::Group, Self::Role, Self::Project];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
            Self::Role => "role",
            Self::Project => "project",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Group => "Group",
            Self::Role => "Role",
            Self::Project => "Project",
        }
    }

    /// Projects match none of the well-known shapes.
    pub fn traits(&self) -> &'static [TypeTrait] {
        match self {
            Self::User => &[TypeTrait::User],
            Self::Group => &[TypeTrait::Group],
            Self::Role => &[TypeTrait::Role],
            Self::Project => &[],
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        ResourceType {
            id: *self,
            display_name: self.display_name().to_string(),
            traits: self.traits().to_vec(),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| DemoError::Validation {
                message: format!("unknown resource type: {s}"),
            })
    }
}
