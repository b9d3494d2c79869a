//! Demo connector core: domain models, repository traits and the
//! access-model resolver that turns stored relationships into grants.

pub mod access;
pub mod error;
pub mod models;
pub mod repository;
