//! fossfund persistence - database entities and persistence layer
//!
//! This crate provides:
//! - SeaORM entity definitions
//! - Persistence trait abstractions used by the HTTP handlers
//! - Domain model types for persistence operations
//! - Schema setup for a PostgreSQL database

pub mod entity;
pub mod model;
pub mod schema;
pub mod sql;
pub mod traits;

// Re-export sea-orm for convenience
pub use sea_orm;

// Re-export entity prelude
pub use entity::prelude::*;

// Re-export persistence traits
pub use traits::{OrganisationPersistence, PersistenceService, ProjectPersistence, UserPersistence};

// Re-export SQL backend
pub use sql::ExternalDbPersistService;

// Re-export model types
pub use model::{
    OAuthProvider, OrganisationDraft, OrganisationInfo, Page, ProjectDraft, ProjectInfo, UrlType,
    UserInfo,
};
