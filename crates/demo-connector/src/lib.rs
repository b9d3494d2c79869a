//! Demo identity connector: resource builders for users, groups, roles and
//! projects over the embedded demo database, plus the host-facing shapes
//! they produce.

pub mod builder;
pub mod config;
pub mod connector;
pub mod credential;
pub mod groups;
pub mod projects;
pub mod resource_types;
pub mod roles;
pub mod sync;
pub mod types;
pub mod users;

pub use builder::{
    AccountManager, CredentialManager, ResourceManager, ResourceProvisioner, ResourceSyncer,
};
pub use config::ConnectorConfig;
pub use connector::{Demo, DemoSyncer};
pub use resource_types::{ResourceKind, ResourceType};
pub use sync::Snapshot;
