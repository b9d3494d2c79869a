//! Domain models for the demo access model.
//!
//! Users are humans. Groups hold users as admins or members. Roles are
//! assigned directly to users or to groups. Projects have exactly one
//! owning user and can be assigned to groups.

pub mod group;
pub mod project;
pub mod role;
pub mod user;
